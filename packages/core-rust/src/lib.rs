//! Workforce Core: worker record types, field validation, and the JSON codec
//! shared by storage and event publication.

pub mod codec;
pub mod types;
pub mod validation;

pub use codec::{decode_record, encode_record, encode_record_string, partition_key};
pub use types::{IdentityType, WorkerDraft, WorkerId, WorkerInput, WorkerRecord, WorkerStatus};
pub use validation::{validate_draft, validate_input, FieldError, ValidationErrors, MIN_AGE};

