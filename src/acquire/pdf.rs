//! PDF text extraction
//!
//! The body is written to a temporary file and handed to an external
//! converter (`pdftotext` by default) that prints the text on stdout. The
//! temporary file is removed on every exit path when its handle drops.

use crate::acquire::error::ExtractError;
use crate::config::FetchConfig;
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use tempfile::NamedTempFile;
use tokio::process::Command;
use url::Url;

/// Text pulled out of a PDF
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfText {
    pub content: String,
    /// First line of the trimmed content
    pub title: String,
}

/// Runs the external converter over fetched PDF bodies
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    tool: String,
    temp_dir: PathBuf,
}

impl PdfExtractor {
    pub fn new(tool: impl Into<String>, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            tool: tool.into(),
            temp_dir: temp_dir.into(),
        }
    }

    pub fn from_config(config: &FetchConfig) -> Self {
        Self::new(config.pdftotext_path.clone(), config.temp_dir())
    }

    /// Extracts text and a title candidate from a PDF body
    ///
    /// Without capture there is nothing to convert and the result is empty.
    pub async fn extract(
        &self,
        url: &Url,
        body: &[u8],
        capture: bool,
    ) -> Result<PdfText, ExtractError> {
        if !capture {
            return Ok(PdfText::default());
        }

        let file = tempfile::Builder::new()
            .prefix(&format!("{}-{}-", file_stem(url), Utc::now().timestamp()))
            .suffix(".pdf")
            .tempfile_in(&self.temp_dir)
            .map_err(ExtractError::TempFile)?;
        tracing::debug!("Writing {} to {}", url, file.path().display());

        tokio::fs::write(file.path(), body)
            .await
            .map_err(ExtractError::TempFile)?;

        let output = self.run_tool(file.path()).await;
        remove_temp_file(file);

        let content = handle_tool_output(output, &self.tool)?;
        let title = first_line(&content);
        tracing::debug!("Extracted {} bytes of text from {}", content.len(), url);

        Ok(PdfText { content, title })
    }

    async fn run_tool(&self, path: &Path) -> io::Result<Output> {
        Command::new(&self.tool)
            .arg(path)
            .arg("-")
            .stdin(Stdio::null())
            .output()
            .await
    }
}

fn remove_temp_file(file: NamedTempFile) {
    let path = file.path().to_path_buf();
    if let Err(e) = file.close() {
        tracing::warn!("Could not remove {}: {}", path.display(), e);
    }
}

/// Maps the converter's exit to its stdout or an error
fn handle_tool_output(result: io::Result<Output>, tool: &str) -> Result<String, ExtractError> {
    match result {
        Ok(output) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        }
        Ok(output) => Err(ExtractError::ToolFailed {
            tool: tool.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(ExtractError::ToolNotFound(tool.to_string()))
        }
        Err(e) => Err(ExtractError::Io(e)),
    }
}

/// Last URL path segment, reduced to filename-safe characters
fn file_stem(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();

    let stem: String = segment
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .take(64)
        .collect();

    if stem.is_empty() {
        "document".to_string()
    } else {
        stem
    }
}

fn first_line(content: &str) -> String {
    content.trim().lines().next().unwrap_or_default().trim().to_string()
}
