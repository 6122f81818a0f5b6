//! Storage module for persisting scraped documents
//!
//! The document store is the system of record: every successful scrape ends up
//! here as one row keyed by the document identifier.

mod schema;
mod sqlite;
mod traits;

pub use schema::{get_schema_version, SCHEMA_VERSION};
pub use sqlite::SqliteStore;
pub use traits::{DocumentStore, StorageError, StorageResult};

use std::path::Path;

/// Opens the document store at the given path
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::new(path)
}
