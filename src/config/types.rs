use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Zeno
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server binds to
    #[serde(rename = "listen-addr")]
    pub listen_addr: String,

    /// Seconds without any request before the service shuts itself down (0 = never)
    #[serde(rename = "idle-timeout-secs")]
    pub idle_timeout_secs: u64,
}

impl ServerConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            idle_timeout_secs: 0,
        }
    }
}

/// Outbound fetch and extraction configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User-Agent header sent with every fetch
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Whole-request timeout in seconds
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Skip TLS certificate verification
    #[serde(rename = "accept-invalid-certs")]
    pub accept_invalid_certs: bool,

    /// Program used to turn PDF files into text
    #[serde(rename = "pdftotext-path")]
    pub pdftotext_path: String,

    /// Directory for temporary PDF files (empty = OS temp dir)
    #[serde(rename = "temp-dir")]
    pub temp_dir: String,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn temp_dir(&self) -> PathBuf {
        if self.temp_dir.is_empty() {
            std::env::temp_dir()
        } else {
            PathBuf::from(&self.temp_dir)
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("zeno/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            accept_invalid_certs: false,
            pdftotext_path: "pdftotext".to_string(),
            temp_dir: String::new(),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: "./zeno.db".to_string(),
        }
    }
}

/// Search engine subprocess and client configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search engine executable
    pub binary: String,

    /// Directory the search engine keeps its data in
    #[serde(rename = "data-path")]
    pub data_path: String,

    /// Address the search engine listens on
    #[serde(rename = "http-addr")]
    pub http_addr: String,

    /// Master key; a non-empty key runs the engine in production mode
    #[serde(rename = "api-key")]
    pub api_key: String,

    /// Name of the index documents are written to
    #[serde(rename = "index-name")]
    pub index_name: String,

    /// Delay between launching the engine and the first liveness probe
    #[serde(rename = "warmup-secs")]
    pub warmup_secs: u64,

    /// Interval between liveness probes
    #[serde(rename = "probe-interval-ms")]
    pub probe_interval_ms: u64,

    /// Timeout of a single liveness probe
    #[serde(rename = "probe-timeout-ms")]
    pub probe_timeout_ms: u64,

    /// Timeout for index and delete requests
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl SearchConfig {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.http_addr)
    }

    pub fn is_production(&self) -> bool {
        !self.api_key.is_empty()
    }

    pub fn warmup(&self) -> Duration {
        Duration::from_secs(self.warmup_secs)
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            binary: "meilisearch".to_string(),
            data_path: "./search.ms".to_string(),
            http_addr: "127.0.0.1:7700".to_string(),
            api_key: String::new(),
            index_name: "sites".to_string(),
            warmup_secs: 5,
            probe_interval_ms: 1000,
            probe_timeout_ms: 100,
            request_timeout_secs: 10,
        }
    }
}
