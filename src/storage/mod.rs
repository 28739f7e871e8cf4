//! SQLite storage shared by the durable cache tier, deduplication and keyword search.

pub mod error;
pub mod migrations;
mod sqlite;

pub use error::{StorageError, StorageResult};
pub use sqlite::Database;

/// Milliseconds since the Unix epoch, the timestamp format used in every table.
pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
