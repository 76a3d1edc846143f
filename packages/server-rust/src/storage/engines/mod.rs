//! Storage backends implementing both [`SequenceStore`](super::SequenceStore)
//! and [`RecordStore`](super::RecordStore).
//!
//! - [`HashMapStorage`]: in-process, `DashMap`-backed; tests and ephemeral runs
//! - [`RedbStorage`]: embedded file database (feature `redb`)
//! - [`PostgresStorage`]: shared SQL database, safe across instances (feature `postgres`)

mod hashmap;
#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "redb")]
mod redb;

pub use hashmap::HashMapStorage;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStorage;
#[cfg(feature = "redb")]
pub use self::redb::RedbStorage;
