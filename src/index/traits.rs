//! Search index traits and error types

use crate::document::Document;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while talking to the search index
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search engine returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid search engine URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;

/// The full-text index documents are fed into
///
/// The index is an external service with its own concurrency control; callers
/// never coordinate writes to it.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Adds the document, replacing any indexed document with the same identifier
    async fn index(&self, doc: &Document) -> IndexResult<()>;

    /// Removes the document with the given identifier
    async fn delete(&self, id: &str) -> IndexResult<()>;
}
