use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigResult;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable that overrides `search.api-key`
pub const API_KEY_ENV: &str = "ZENO_KEY";

/// Loads and parses a configuration file from the given path
///
/// The search engine key from [`API_KEY_ENV`] takes precedence over the key in
/// the file, so the file can be committed without secrets.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use zeno::config::load_config;
///
/// let config = load_config(Path::new("zeno.toml")).unwrap();
/// println!("Listening on {}", config.server.listen_addr);
/// ```
pub fn load_config(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path)?;
    let mut config = parse_config(&content)?;

    if let Ok(key) = std::env::var(API_KEY_ENV) {
        if !key.is_empty() {
            config.search.api_key = key;
        }
    }

    validate(&config)?;
    Ok(config)
}

/// Parses configuration from a TOML string without touching the environment
pub fn parse_config(content: &str) -> ConfigResult<Config> {
    let config: Config = toml::from_str(content)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so operators can tell which configuration a running
/// instance was started with.
pub fn compute_config_hash(path: &Path) -> ConfigResult<String> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> ConfigResult<(Config, String)> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}
