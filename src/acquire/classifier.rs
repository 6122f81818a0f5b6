//! Document type classification
//!
//! A `.pdf` extension wins over whatever the server claims. HTML is only
//! trusted when the path carries no extension at all and the content type says
//! so. Everything else is `Unknown` and never guessed at.

use crate::document::DocType;

/// Classifies a response by its URL path and `Content-Type` header
pub fn classify(url_path: &str, content_type: &str) -> DocType {
    match path_extension(url_path) {
        Some(ext) if ext.eq_ignore_ascii_case(".pdf") => DocType::Pdf,
        None if is_html_content_type(content_type) => DocType::Html,
        _ => DocType::Unknown,
    }
}

/// Extension of the last path segment, including the leading dot
///
/// Only the final segment counts, so `/v1.2/report` has no extension and
/// neither does a path ending in `/`.
fn path_extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment.rfind('.').map(|pos| &segment[pos..])
}

fn is_html_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("text/html")
}
