//! Worker domain types shared by storage, the HTTP API and published events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier assigned to a worker at registration.
///
/// Issued from a durable sequence and never reused, even when the record
/// that carried it is deleted or its insert failed.
pub type WorkerId = i32;

/// Lifecycle status of a registered worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerStatus {
    /// Freshly registered, not yet assigned to any duty.
    Registered,
    /// Currently working a shift.
    OnDuty,
    /// Regular worker between shifts.
    Regular,
    /// Deregistered; kept for history.
    Unregistered,
}

/// Kind of identity document backing `identity_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IdentityType {
    NationalId,
    Passport,
    DrivingLicense,
    VoterId,
    TaxId,
}

/// Caller-supplied worker fields.
///
/// Carries everything except `id` and `timestamp`, which are stamped by the
/// registration pipeline. Unknown JSON fields (including a client-sent `id`)
/// are ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerInput {
    pub name: String,
    pub age: i32,
    pub phone_number: String,
    pub identity_type: IdentityType,
    pub identity_data: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: WorkerStatus,
}

/// A worker payload as it arrives over the wire, before validation.
///
/// Every field is optional so that a missing or `null` value is reported
/// against its own field name by [`validate_draft`](crate::validate_draft)
/// instead of failing deserialization as a whole.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkerDraft {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub phone_number: Option<String>,
    pub identity_type: Option<IdentityType>,
    pub identity_data: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub status: Option<WorkerStatus>,
}

impl From<WorkerInput> for WorkerDraft {
    fn from(input: WorkerInput) -> Self {
        Self {
            name: Some(input.name),
            age: Some(input.age),
            phone_number: Some(input.phone_number),
            identity_type: Some(input.identity_type),
            identity_data: Some(input.identity_data),
            address: Some(input.address),
            latitude: Some(input.latitude),
            longitude: Some(input.longitude),
            status: Some(input.status),
        }
    }
}

/// A persisted worker.
///
/// Field order and names match the stored document and the published event:
/// camelCase keys, enum values in `SCREAMING_SNAKE_CASE`, and `timestamp`
/// rendered as an RFC 3339 / ISO-8601 string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRecord {
    pub id: WorkerId,
    pub name: String,
    pub age: i32,
    pub phone_number: String,
    pub identity_type: IdentityType,
    pub identity_data: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub status: WorkerStatus,
    pub timestamp: DateTime<Utc>,
}

impl WorkerRecord {
    /// Builds a record from validated input, an allocated id and the creation time.
    #[must_use]
    pub fn new(id: WorkerId, input: WorkerInput, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            name: input.name,
            age: input.age,
            phone_number: input.phone_number,
            identity_type: input.identity_type,
            identity_data: input.identity_data,
            address: input.address,
            latitude: input.latitude,
            longitude: input.longitude,
            status: input.status,
            timestamp,
        }
    }

    /// Applies the mutable subset of `input`: name, phone number and address.
    ///
    /// `id` and `timestamp` are never touched; the remaining fields are fixed
    /// at registration.
    pub fn apply_update(&mut self, input: &WorkerInput) {
        self.name.clone_from(&input.name);
        self.phone_number.clone_from(&input.phone_number);
        self.address.clone_from(&input.address);
    }
}
