//! Persistence and indexing of finished documents
//!
//! Saving writes the store first and the index second. An index failure after a
//! successful store write is logged and swallowed, so the store may run ahead of
//! the index until the document is scraped again.
//!
//! Deleting goes the other way round: the index entry is removed first and the
//! store row only afterwards. If the index refuses, the store is left alone and
//! the error is returned. If the store delete fails after the index delete
//! succeeded, the error is returned as well and the two are out of step until
//! the delete is retried.

use crate::document::{derive_id, Document};
use crate::index::{IndexError, SearchIndex};
use crate::storage::{DocumentStore, StorageError};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced by catalog operations
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Document identifier cannot be empty")]
    EmptyId,

    #[error("Error saving document {url}: {source}")]
    Save { url: String, source: StorageError },

    #[error("Cannot delete {id} from index: {source}")]
    IndexDelete { id: String, source: IndexError },

    #[error("Cannot delete {id} from store: {source}")]
    StoreDelete { id: String, source: StorageError },
}

/// Result of a successful save
#[derive(Debug, Clone)]
pub struct Saved {
    /// The document as persisted, with `id` and `parsed_at` set
    pub document: Document,

    /// Whether the index accepted the document
    pub indexed: bool,
}

/// Coordinates the document store and the search index
pub struct Catalog {
    store: Arc<dyn DocumentStore>,
    index: Arc<dyn SearchIndex>,
}

impl Catalog {
    pub fn new(store: Arc<dyn DocumentStore>, index: Arc<dyn SearchIndex>) -> Self {
        Self { store, index }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Persists a document, then submits it to the index
    ///
    /// Only a store failure is an error; an index failure is logged and
    /// reported through [`Saved::indexed`].
    pub async fn save_and_index(&self, mut doc: Document) -> Result<Saved, CatalogError> {
        doc.parsed_at = Some(Utc::now());
        if doc.id.is_empty() {
            doc.id = derive_id(&doc.url);
        }

        self.store.save(&doc).map_err(|source| {
            tracing::error!("Failed to persist {}: {}", doc.url, source);
            CatalogError::Save {
                url: doc.url.clone(),
                source,
            }
        })?;

        let indexed = match self.index.index(&doc).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    "Document {} saved but not indexed, store is ahead of index: {}",
                    doc.url,
                    e
                );
                false
            }
        };

        Ok(Saved {
            document: doc,
            indexed,
        })
    }

    /// Removes a document from the index, then from the store
    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        if id.is_empty() {
            return Err(CatalogError::EmptyId);
        }

        self.index
            .delete(id)
            .await
            .map_err(|source| CatalogError::IndexDelete {
                id: id.to_string(),
                source,
            })?;

        self.store.delete(id).map_err(|source| {
            tracing::error!(
                "Document {} removed from index but not from store: {}",
                id,
                source
            );
            CatalogError::StoreDelete {
                id: id.to_string(),
                source,
            }
        })
    }
}
