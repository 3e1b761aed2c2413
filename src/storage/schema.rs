//! Database schema for the notification record store

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One generated notification per trip leg and message type
CREATE TABLE IF NOT EXISTS trip_notifications (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    trip_id TEXT NOT NULL,
    leg_request_id TEXT NOT NULL,
    message_type TEXT NOT NULL,
    notification TEXT NOT NULL,
    quick_tips TEXT NOT NULL,
    extra_info TEXT NOT NULL,
    raw_leg TEXT NOT NULL,
    email TEXT NOT NULL,
    title TEXT NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(trip_id, leg_request_id, message_type)
);

CREATE INDEX IF NOT EXISTS idx_notifications_trip ON trip_notifications(trip_id);
CREATE INDEX IF NOT EXISTS idx_notifications_created ON trip_notifications(created_at);
"#;

/// Creates the tables and indexes if they do not exist yet
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
