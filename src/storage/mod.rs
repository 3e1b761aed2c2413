//! Storage module for generated notifications
//!
//! This module persists the notifications produced from crawl sessions:
//! - SQLite database initialization and schema management
//! - Upserts keyed by trip, leg and message type
//! - Lookups by trip with optional leg and recipient filters

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteRecordStore;
pub use traits::{RecordStore, StorageError, StorageResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Opens or creates a record store database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteRecordStore)` - Successfully opened store
/// * `Err(StorageError)` - Failed to open the file or create the schema
pub fn open_store(path: &Path) -> StorageResult<SqliteRecordStore> {
    SqliteRecordStore::new(path)
}

/// A notification as written to the store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub trip_id: String,
    pub leg_request_id: String,
    pub message_type: String,

    /// Notification body sent to the user
    pub notification: String,
    pub quick_tips: Vec<String>,
    pub extra_info: String,

    /// Source payload the notification was generated from
    pub raw_leg: serde_json::Value,
    pub email: String,
    pub title: String,
}

/// A record read back from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNotification {
    pub id: i64,
    pub created_at: DateTime<Utc>,

    #[serde(flatten)]
    pub record: NotificationRecord,
}
