use thiserror::Error;

/// Errors raised while fetching a resource
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },
}

/// Errors raised while extracting text from a fetched body
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Could not write temporary file: {0}")]
    TempFile(std::io::Error),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
