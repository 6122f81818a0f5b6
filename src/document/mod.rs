//! Document model
//!
//! A [`Document`] is the unit of work of one scrape: created when a request is
//! submitted, filled in by fetch and extraction, then handed to the catalog for
//! persistence and indexing.

mod id;

pub use id::{derive_id, url_from_id};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Kind of a fetched resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Html,
    Pdf,
    /// Not yet classified, or not a supported kind
    #[default]
    Unknown,
}

impl DocType {
    /// Converts the document type to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a document type from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "html" => Some(Self::Html),
            "pdf" => Some(Self::Pdf),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// A scraped web resource and its catalog metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier derived from `url`
    pub id: String,

    /// Canonical address that was fetched
    pub url: String,

    /// Caller-supplied title, or the extracted one when the caller gave none
    pub title: String,

    /// Caller-supplied description
    pub description: String,

    /// Extracted plain text; empty unless capture was requested
    pub content: String,

    /// Whether the body should be downloaded and its text extracted
    pub capture_requested: bool,

    pub doc_type: DocType,

    /// When persistence was last attempted
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub parsed_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Creates a document for a freshly submitted scrape request
    pub fn new(url: &Url, title: String, description: String, capture_requested: bool) -> Self {
        Self {
            id: derive_id(url.as_str()),
            url: url.to_string(),
            title,
            description,
            content: String::new(),
            capture_requested,
            doc_type: DocType::Unknown,
            parsed_at: None,
        }
    }

    /// Rebinds the document to the URL that was actually fetched
    ///
    /// Redirects can move a request to a different canonical URL, and the
    /// identifier has to follow it.
    pub fn set_url(&mut self, url: &Url) {
        self.url = url.to_string();
        self.id = derive_id(&self.url);
    }

    /// Fills the title only if the caller did not supply one
    pub fn fill_title(&mut self, title: &str) {
        if self.title.is_empty() {
            self.title = title.to_string();
        }
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Document{{id: {}, url: {:?}, title: {:?}, description: {:?}, content: {:?}, capture: {}, type: {}}}",
            self.id,
            preview(&self.url, 50),
            preview(&self.title, 25),
            preview(&self.description, 50),
            preview(&self.content, 50),
            self.capture_requested,
            self.doc_type,
        )
    }
}

/// Shortens text for log lines without splitting a character
fn preview(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
