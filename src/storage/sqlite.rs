//! SQLite record store
//!
//! This module provides a SQLite-based implementation of the RecordStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StorageError, StorageResult};
use crate::storage::{NotificationRecord, StoredNotification};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::Path;

const SELECT_COLUMNS: &str = "SELECT id, trip_id, leg_request_id, message_type, notification, \
     quick_tips, extra_info, raw_leg, email, title, created_at FROM trip_notifications";

/// SQLite storage backend
pub struct SqliteRecordStore {
    conn: Connection,
}

impl std::fmt::Debug for SqliteRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteRecordStore").finish_non_exhaustive()
    }
}

/// Columns as they come out of SQLite, before JSON and timestamp decoding
struct RawRow {
    id: i64,
    trip_id: String,
    leg_request_id: String,
    message_type: String,
    notification: String,
    quick_tips: String,
    extra_info: String,
    raw_leg: String,
    email: String,
    title: String,
    created_at: String,
}

impl RawRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            trip_id: row.get(1)?,
            leg_request_id: row.get(2)?,
            message_type: row.get(3)?,
            notification: row.get(4)?,
            quick_tips: row.get(5)?,
            extra_info: row.get(6)?,
            raw_leg: row.get(7)?,
            email: row.get(8)?,
            title: row.get(9)?,
            created_at: row.get(10)?,
        })
    }

    fn decode(self) -> StorageResult<StoredNotification> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| StorageError::Corrupt {
                id: self.id,
                reason: format!("bad created_at: {}", e),
            })?
            .with_timezone(&Utc);

        Ok(StoredNotification {
            id: self.id,
            created_at,
            record: NotificationRecord {
                trip_id: self.trip_id,
                leg_request_id: self.leg_request_id,
                message_type: self.message_type,
                notification: self.notification,
                quick_tips: serde_json::from_str(&self.quick_tips)?,
                extra_info: self.extra_info,
                raw_leg: serde_json::from_str(&self.raw_leg)?,
                email: self.email,
                title: self.title,
            },
        })
    }
}

impl SqliteRecordStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteRecordStore {
    fn save(&mut self, record: &NotificationRecord) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let quick_tips = serde_json::to_string(&record.quick_tips)?;
        let raw_leg = serde_json::to_string(&record.raw_leg)?;

        let id = self.conn.query_row(
            "INSERT INTO trip_notifications
                (trip_id, leg_request_id, message_type, notification, quick_tips,
                 extra_info, raw_leg, email, title, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(trip_id, leg_request_id, message_type) DO UPDATE SET
                notification = excluded.notification,
                quick_tips = excluded.quick_tips,
                extra_info = excluded.extra_info,
                raw_leg = excluded.raw_leg,
                email = excluded.email,
                title = excluded.title,
                created_at = excluded.created_at
             RETURNING id",
            params![
                record.trip_id,
                record.leg_request_id,
                record.message_type,
                record.notification,
                quick_tips,
                record.extra_info,
                raw_leg,
                record.email,
                record.title,
                now,
            ],
            |row| row.get(0),
        )?;

        tracing::debug!(
            "Stored notification {} for trip {} leg {}",
            id,
            record.trip_id,
            record.leg_request_id
        );
        Ok(id)
    }

    fn get(&self, id: i64) -> StorageResult<StoredNotification> {
        let raw = self
            .conn
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                RawRow::from_row,
            )
            .optional()?
            .ok_or(StorageError::NotFound(id))?;

        raw.decode()
    }

    fn find(
        &self,
        trip_id: &str,
        leg_request_id: Option<&str>,
        email: Option<&str>,
    ) -> StorageResult<Vec<StoredNotification>> {
        let mut sql = format!("{} WHERE trip_id = ?", SELECT_COLUMNS);
        let mut args = vec![trip_id];

        if let Some(leg) = leg_request_id {
            sql.push_str(" AND leg_request_id = ?");
            args.push(leg);
        }
        if let Some(email) = email {
            sql.push_str(" AND email = ?");
            args.push(email);
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), RawRow::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?.decode()?);
        }
        Ok(records)
    }
}
