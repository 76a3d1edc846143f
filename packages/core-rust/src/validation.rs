//! Field-level validation for incoming worker payloads.
//!
//! Runs at the API boundary. The registration pipeline assumes its input has
//! already passed [`validate_input`].

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::types::{WorkerDraft, WorkerInput};

/// Minimum age accepted for registration.
pub const MIN_AGE: i32 = 18;

const PHONE_PATTERN: &str = r"^\+?[0-9. ()-]{7,25}$";

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire (camelCase) name of the offending field.
    pub field: &'static str,
    /// Human-readable reason.
    pub message: String,
}

/// All field violations found in one payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) failed validation", .errors.len())]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Field name to message, as returned to HTTP clients.
    ///
    /// If one field has several violations the first one wins.
    #[must_use]
    pub fn to_field_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for err in &self.errors {
            map.entry(err.field.to_string())
                .or_insert_with(|| err.message.clone());
        }
        map
    }

    /// Whether `field` has at least one violation.
    #[must_use]
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

fn phone_regex() -> &'static Regex {
    static PHONE: OnceLock<Regex> = OnceLock::new();
    PHONE.get_or_init(|| Regex::new(PHONE_PATTERN).unwrap_or_else(|_| unreachable!()))
}

/// Validates `input` against the worker field constraints.
///
/// # Errors
///
/// Returns every violated constraint, not just the first.
pub fn validate_input(input: &WorkerInput) -> Result<(), ValidationErrors> {
    validate_draft(WorkerDraft::from(input.clone())).map(|_| ())
}

/// Validates a wire payload and, when it passes, turns it into a [`WorkerInput`].
///
/// A missing or `null` text field is reported as blank and a missing `age`
/// reads as zero. The remaining required fields report that they cannot be
/// null.
///
/// # Errors
///
/// Returns every violated constraint, not just the first.
pub fn validate_draft(draft: WorkerDraft) -> Result<WorkerInput, ValidationErrors> {
    let mut errors = Vec::new();
    let mut reject = |field: &'static str, message: &str| {
        errors.push(FieldError {
            field,
            message: message.to_string(),
        });
    };

    let name = draft.name.unwrap_or_default();
    if name.trim().is_empty() {
        reject("name", "Name cannot be blank");
    }
    let age = draft.age.unwrap_or_default();
    if age < MIN_AGE {
        reject("age", "Age must be at least 18");
    }
    let phone_number = draft.phone_number.unwrap_or_default();
    if phone_number.trim().is_empty() {
        reject("phoneNumber", "Phone number cannot be blank");
    } else if !phone_regex().is_match(&phone_number) {
        reject("phoneNumber", "Invalid phone number format");
    }
    if draft.identity_type.is_none() {
        reject("identityType", "Identity type cannot be null");
    }
    let identity_data = draft.identity_data.unwrap_or_default();
    if identity_data.trim().is_empty() {
        reject("identityData", "Identity data cannot be blank");
    }
    let address = draft.address.unwrap_or_default();
    if address.trim().is_empty() {
        reject("address", "Address cannot be blank");
    }
    match draft.latitude {
        None => reject("latitude", "Latitude cannot be null"),
        Some(lat) if !(lat.is_finite() && (-90.0..=90.0).contains(&lat)) => {
            reject("latitude", "Latitude must be between -90 and 90");
        }
        Some(_) => {}
    }
    match draft.longitude {
        None => reject("longitude", "Longitude cannot be null"),
        Some(lon) if !(lon.is_finite() && (-180.0..=180.0).contains(&lon)) => {
            reject("longitude", "Longitude must be between -180 and 180");
        }
        Some(_) => {}
    }
    if draft.status.is_none() {
        reject("status", "Status cannot be null");
    }

    match (
        draft.identity_type,
        draft.latitude,
        draft.longitude,
        draft.status,
    ) {
        (Some(identity_type), Some(latitude), Some(longitude), Some(status))
            if errors.is_empty() =>
        {
            Ok(WorkerInput {
                name,
                age,
                phone_number,
                identity_type,
                identity_data,
                address,
                latitude,
                longitude,
                status,
            })
        }
        _ => Err(ValidationErrors { errors }),
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::{IdentityType, WorkerStatus};

    fn valid_input() -> WorkerInput {
        WorkerInput {
            name: "Meera".to_string(),
            age: 18,
            phone_number: "+1 (555) 010-2030".to_string(),
            identity_type: IdentityType::DrivingLicense,
            identity_data: "DL-0042".to_string(),
            address: "9 Harbour Lane".to_string(),
            latitude: -90.0,
            longitude: 180.0,
            status: WorkerStatus::Registered,
        }
    }

    #[test]
    fn accepts_boundary_values() {
        assert!(validate_input(&valid_input()).is_ok());
    }

    #[test]
    fn rejects_blank_strings() {
        let mut input = valid_input();
        input.name = "   ".to_string();
        input.address = String::new();
        input.identity_data = String::new();

        let err = validate_input(&input).unwrap_err();
        assert!(err.has_field("name"));
        assert!(err.has_field("address"));
        assert!(err.has_field("identityData"));
        assert_eq!(err.errors.len(), 3);
    }

    #[test]
    fn rejects_underage_worker() {
        let mut input = valid_input();
        input.age = 17;
        let err = validate_input(&input).unwrap_err();
        assert_eq!(
            err.to_field_map().get("age").map(String::as_str),
            Some("Age must be at least 18")
        );
    }

    #[test]
    fn rejects_malformed_phone_numbers() {
        for phone in ["12345", "call me maybe", "+1-555-0100-ext-99-and-more-digits"] {
            let mut input = valid_input();
            input.phone_number = phone.to_string();
            let err = validate_input(&input).unwrap_err();
            assert!(err.has_field("phoneNumber"), "{phone} should be rejected");
        }
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let mut input = valid_input();
        input.latitude = f64::NAN;
        input.longitude = f64::INFINITY;
        let err = validate_input(&input).unwrap_err();
        assert!(err.has_field("latitude"));
        assert!(err.has_field("longitude"));
    }

    #[test]
    fn field_map_keeps_first_message_per_field() {
        let errors = ValidationErrors {
            errors: vec![
                FieldError {
                    field: "name",
                    message: "first".to_string(),
                },
                FieldError {
                    field: "name",
                    message: "second".to_string(),
                },
            ],
        };
        assert_eq!(errors.to_field_map()["name"], "first");
    }

    #[test]
    fn draft_with_every_field_becomes_input() {
        let input = valid_input();
        assert_eq!(validate_draft(WorkerDraft::from(input.clone())).unwrap(), input);
    }

    #[test]
    fn missing_fields_are_reported_by_name() {
        let err = validate_draft(WorkerDraft::default()).unwrap_err();
        let map = err.to_field_map();

        assert_eq!(map["name"], "Name cannot be blank");
        assert_eq!(map["age"], "Age must be at least 18");
        assert_eq!(map["phoneNumber"], "Phone number cannot be blank");
        assert_eq!(map["identityType"], "Identity type cannot be null");
        assert_eq!(map["identityData"], "Identity data cannot be blank");
        assert_eq!(map["address"], "Address cannot be blank");
        assert_eq!(map["latitude"], "Latitude cannot be null");
        assert_eq!(map["longitude"], "Longitude cannot be null");
        assert_eq!(map["status"], "Status cannot be null");
        assert_eq!(map.len(), 9);
    }

    #[test]
    fn single_null_field_is_the_only_error() {
        let mut draft = WorkerDraft::from(valid_input());
        draft.status = None;
        let err = validate_draft(draft).unwrap_err();
        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.to_field_map()["status"], "Status cannot be null");
    }

    proptest! {
        #[test]
        fn latitude_outside_range_is_rejected(lat in prop_oneof![-1.0e6..-90.000_001f64, 90.000_001f64..1.0e6]) {
            let mut input = valid_input();
            input.latitude = lat;
            let err = validate_input(&input).unwrap_err();
            prop_assert!(err.has_field("latitude"));
        }

        #[test]
        fn coordinates_inside_range_are_accepted(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            let mut input = valid_input();
            input.latitude = lat;
            input.longitude = lon;
            prop_assert!(validate_input(&input).is_ok());
        }
    }
}
