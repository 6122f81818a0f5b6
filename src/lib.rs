//! Zeno: an on-demand web catalog
//!
//! This crate fetches single web resources on request, classifies them, extracts
//! plain text, persists the resulting documents and feeds them to an external
//! search engine whose process it supervises.

pub mod acquire;
pub mod catalog;
pub mod config;
pub mod document;
pub mod index;
pub mod server;
pub mod storage;
pub mod supervisor;

use thiserror::Error;

/// Main error type for Zeno operations
#[derive(Debug, Error)]
pub enum ZenoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Document identifier cannot be empty")]
    EmptyId,

    #[error("Service is shutting down")]
    ShuttingDown,

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: acquire::AcquireState,
        to: acquire::AcquireState,
    },

    #[error("Unknown document type for {0}")]
    UnknownDocType(String),

    #[error("Fetch error: {0}")]
    Fetch(#[from] acquire::FetchError),

    #[error("Extraction error: {0}")]
    Extract(#[from] acquire::ExtractError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Index error: {0}")]
    Index(#[from] index::IndexError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] catalog::CatalogError),

    #[error("Supervisor error: {0}")]
    Supervisor(#[from] supervisor::SupervisorError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid address in config: {0}")]
    InvalidAddress(String),
}

/// Result type alias for Zeno operations
pub type Result<T> = std::result::Result<T, ZenoError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use document::{derive_id, DocType, Document};
