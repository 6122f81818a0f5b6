//! Storage traits and error types
//!
//! This module defines the trait interface for document stores and the
//! associated error types.

use crate::document::Document;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document identifier cannot be empty")]
    EmptyId,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record {id}: {reason}")]
    CorruptRecord { id: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// The system of record for scraped documents
///
/// Implementations are shared across concurrently running scrapes and must do
/// their own synchronization. Writes are upserts keyed by [`Document::id`], so
/// the last writer for an identifier wins.
pub trait DocumentStore: Send + Sync {
    /// Inserts the document, or replaces the record with the same identifier
    fn save(&self, doc: &Document) -> StorageResult<()>;

    /// Gets a document by identifier
    fn get(&self, id: &str) -> StorageResult<Option<Document>>;

    /// Gets every stored document, most recently parsed first
    fn get_all(&self) -> StorageResult<Vec<Document>>;

    /// Deletes a document; deleting an unknown identifier is not an error
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// Counts stored documents
    fn count(&self) -> StorageResult<u64>;
}
