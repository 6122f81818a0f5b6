//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the DocumentStore trait.

use crate::document::{DocType, Document};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DocumentStore, StorageError, StorageResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SELECT_COLUMNS: &str =
    "SELECT id, url, title, description, content, capture_requested, doc_type, parsed_at FROM documents";

/// SQLite document store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

/// A row as read from the database, before field conversion
struct DocumentRow {
    id: String,
    url: String,
    title: String,
    description: String,
    content: String,
    capture_requested: bool,
    doc_type: String,
    parsed_at: Option<String>,
}

impl DocumentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            url: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            content: row.get(4)?,
            capture_requested: row.get(5)?,
            doc_type: row.get(6)?,
            parsed_at: row.get(7)?,
        })
    }

    fn into_document(self) -> StorageResult<Document> {
        let doc_type =
            DocType::from_db_string(&self.doc_type).ok_or_else(|| StorageError::CorruptRecord {
                id: self.id.clone(),
                reason: format!("unknown doc_type '{}'", self.doc_type),
            })?;

        let parsed_at = match self.parsed_at {
            Some(ts) => Some(
                DateTime::parse_from_rfc3339(&ts)
                    .map_err(|e| StorageError::CorruptRecord {
                        id: self.id.clone(),
                        reason: format!("bad parsed_at '{}': {}", ts, e),
                    })?
                    .with_timezone(&Utc),
            ),
            None => None,
        };

        Ok(Document {
            id: self.id,
            url: self.url,
            title: self.title,
            description: self.description,
            content: self.content,
            capture_requested: self.capture_requested,
            doc_type,
            parsed_at,
        })
    }
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    pub fn new(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection lock poisoned".to_string()))
    }
}

impl DocumentStore for SqliteStore {
    fn save(&self, doc: &Document) -> StorageResult<()> {
        if doc.id.is_empty() {
            return Err(StorageError::EmptyId);
        }

        let now = Utc::now().to_rfc3339();
        let parsed_at = doc.parsed_at.map(|ts| ts.to_rfc3339());

        self.conn()?.execute(
            "INSERT INTO documents
                (id, url, title, description, content, capture_requested, doc_type, parsed_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
             ON CONFLICT(id) DO UPDATE SET
                url = excluded.url,
                title = excluded.title,
                description = excluded.description,
                content = excluded.content,
                capture_requested = excluded.capture_requested,
                doc_type = excluded.doc_type,
                parsed_at = excluded.parsed_at,
                updated_at = excluded.updated_at",
            params![
                doc.id,
                doc.url,
                doc.title,
                doc.description,
                doc.content,
                doc.capture_requested,
                doc.doc_type.to_db_string(),
                parsed_at,
                now,
            ],
        )?;

        Ok(())
    }

    fn get(&self, id: &str) -> StorageResult<Option<Document>> {
        if id.is_empty() {
            return Err(StorageError::EmptyId);
        }

        let row = self
            .conn()?
            .query_row(
                &format!("{} WHERE id = ?1", SELECT_COLUMNS),
                params![id],
                DocumentRow::from_row,
            )
            .optional()?;

        row.map(DocumentRow::into_document).transpose()
    }

    fn get_all(&self) -> StorageResult<Vec<Document>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY parsed_at DESC, id ASC",
            SELECT_COLUMNS
        ))?;

        let rows = stmt
            .query_map([], DocumentRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(DocumentRow::into_document).collect()
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        if id.is_empty() {
            return Err(StorageError::EmptyId);
        }

        let deleted = self
            .conn()?
            .execute("DELETE FROM documents WHERE id = ?1", params![id])?;

        if deleted == 0 {
            tracing::debug!("Delete of unknown document {}", id);
        }

        Ok(())
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn()?
                .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
