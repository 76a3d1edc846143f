//! JSON codec for worker documents and registration events.
//!
//! The stored document and the published event share one encoding: the
//! canonical `serde_json` rendering of [`WorkerRecord`], with the timestamp as
//! an ISO-8601 string rather than a numeric epoch.

use crate::types::{WorkerId, WorkerRecord};

/// Encodes a record as its canonical JSON bytes.
///
/// # Errors
///
/// Returns an error if serialization fails. `serde_json` writes a non-finite
/// float as `null`, which [`decode_record`] cannot read back; records built
/// from input that passed [`validate_input`](crate::validate_input) never
/// carry one.
pub fn encode_record(record: &WorkerRecord) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(record)
}

/// Encodes a record as its canonical JSON text, for stores with a text column.
///
/// # Errors
///
/// Same as [`encode_record`].
pub fn encode_record_string(record: &WorkerRecord) -> Result<String, serde_json::Error> {
    serde_json::to_string(record)
}

/// Decodes a record from JSON bytes produced by [`encode_record`].
///
/// # Errors
///
/// Returns an error if the bytes are not a valid worker document.
pub fn decode_record(bytes: &[u8]) -> Result<WorkerRecord, serde_json::Error> {
    serde_json::from_slice(bytes)
}

/// Partition/ordering key for a worker's events.
#[must_use]
pub fn partition_key(id: WorkerId) -> String {
    id.to_string()
}
