//! Configuration module for Zeno
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use zeno::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("zeno.toml")).unwrap();
//! println!("Search engine at {}", config.search.base_url());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, FetchConfig, SearchConfig, ServerConfig, StoreConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, API_KEY_ENV,
};
pub use validation::validate;
