//! Storage for the workforce server.
//!
//! Two traits sit over every backend:
//!
//! - [`SequenceStore`]: named counters with an atomic upsert-increment, fronted
//!   by [`SequenceAllocator`]
//! - [`RecordStore`]: worker documents keyed by id
//!
//! Backends live in [`engines`] and are selected at startup by
//! [`StorageFactory`].

pub mod engines;
pub mod error;
pub mod factory;
pub mod record_store;
pub mod sequence;

pub use error::StorageError;
pub use factory::{StorageBackend, StorageConfig, StorageFactory, StorageHandles};
pub use record_store::RecordStore;
pub use sequence::{SequenceAllocator, SequenceStore};
