use crate::config::types::{Config, FetchConfig, SearchConfig, ServerConfig, StoreConfig};
use crate::{ConfigError, ConfigResult};
use std::net::SocketAddr;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_server_config(&config.server)?;
    validate_fetch_config(&config.fetch)?;
    validate_store_config(&config.store)?;
    validate_search_config(&config.search)?;
    Ok(())
}

fn validate_server_config(config: &ServerConfig) -> ConfigResult<()> {
    validate_socket_addr("listen-addr", &config.listen_addr)
}

fn validate_fetch_config(config: &FetchConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "timeout-secs must be > 0".to_string(),
        ));
    }

    if config.pdftotext_path.is_empty() {
        return Err(ConfigError::Validation(
            "pdftotext-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_store_config(config: &StoreConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database-path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> ConfigResult<()> {
    if config.binary.is_empty() {
        return Err(ConfigError::Validation(
            "search binary cannot be empty".to_string(),
        ));
    }

    if config.data_path.is_empty() {
        return Err(ConfigError::Validation(
            "data-path cannot be empty".to_string(),
        ));
    }

    validate_socket_addr("http-addr", &config.http_addr)?;
    validate_index_name(&config.index_name)?;

    // Probes must stay cheap: a slow health endpoint counts as a failure.
    if config.probe_timeout_ms == 0 || config.probe_timeout_ms >= 1000 {
        return Err(ConfigError::Validation(format!(
            "probe-timeout-ms must be between 1 and 999, got {}",
            config.probe_timeout_ms
        )));
    }

    if config.probe_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "probe-interval-ms must be >= 10, got {}",
            config.probe_interval_ms
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be > 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_socket_addr(key: &str, addr: &str) -> ConfigResult<()> {
    addr.parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidAddress(format!("{} '{}': {}", key, addr, e)))
}

/// Index names end up in request paths, so only a conservative charset is allowed
fn validate_index_name(name: &str) -> ConfigResult<()> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "index-name cannot be empty".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ConfigError::Validation(format!(
            "index-name must contain only ASCII alphanumerics, '-' and '_', got '{}'",
            name
        )));
    }

    Ok(())
}
