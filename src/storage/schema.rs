//! Database schema definitions
//!
//! This module contains the SQL schema for the Zeno document store.

use rusqlite::Connection;

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per canonical URL
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY NOT NULL,
    url TEXT NOT NULL,
    title TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    content TEXT NOT NULL DEFAULT '',
    capture_requested INTEGER NOT NULL DEFAULT 0,
    doc_type TEXT NOT NULL,
    parsed_at TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_parsed_at ON documents(parsed_at);
"#;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Creates all tables and records the schema version
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    Ok(())
}

/// Reads the schema version stored in the database
pub fn get_schema_version(conn: &Connection) -> Result<i32, rusqlite::Error> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
}
