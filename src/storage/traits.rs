//! Record store trait and error types

use crate::storage::{NotificationRecord, StoredNotification};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt record {id}: {reason}")]
    Corrupt { id: i64, reason: String },

    #[error("Record not found: {0}")]
    NotFound(i64),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Persistence for generated notifications
///
/// Records are keyed by `(trip_id, leg_request_id, message_type)`: saving a
/// record with an existing key replaces the stored one.
pub trait RecordStore {
    /// Inserts or replaces a record
    ///
    /// # Returns
    ///
    /// The row id of the stored record
    fn save(&mut self, record: &NotificationRecord) -> StorageResult<i64>;

    /// Gets a record by row id
    fn get(&self, id: i64) -> StorageResult<StoredNotification>;

    /// Lists the records of a trip, newest first
    ///
    /// # Arguments
    ///
    /// * `trip_id` - Trip to look up
    /// * `leg_request_id` - Only records for this leg, when given
    /// * `email` - Only records for this recipient, when given
    fn find(
        &self,
        trip_id: &str,
        leg_request_id: Option<&str>,
        email: Option<&str>,
    ) -> StorageResult<Vec<StoredNotification>>;
}
