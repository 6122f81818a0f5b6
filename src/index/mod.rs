//! Search index module
//!
//! Documents are fed into an external full-text engine after they have been
//! persisted. Ranking and query handling are entirely the engine's business.

mod meilisearch;
mod traits;

pub use meilisearch::MeilisearchIndex;
pub use traits::{IndexError, IndexResult, SearchIndex};
