//! Acquisition orchestrator
//!
//! Each accepted request becomes its own task that walks the pipeline:
//!
//! ```text
//! Submitted -> Requested -> Fetched -> Classified -> Extracted -> Finalized
//!                       \-> Aborted -/            \______________/
//! ```
//!
//! Any error moves the request to `Failed`; the document is logged and dropped.
//! Nothing is retried.

use crate::acquire::classifier::classify;
use crate::acquire::fetcher::{build_http_client, fetch};
use crate::acquire::html::{extract_text, extract_title};
use crate::acquire::inflight::InFlight;
use crate::acquire::pdf::PdfExtractor;
use crate::acquire::AcquireState;
use crate::catalog::Catalog;
use crate::config::FetchConfig;
use crate::document::{DocType, Document};
use crate::{Result, ZenoError};
use reqwest::Client;
use scraper::Html;
use serde::Deserialize;
use std::sync::Arc;
use tokio::task::JoinHandle;
use url::Url;

/// A request to acquire one resource
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Download and extract the body, not just catalog the URL
    #[serde(default)]
    pub capture: bool,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>, capture: bool) -> Self {
        Self {
            url: url.into(),
            capture,
            ..Self::default()
        }
    }

    /// Checks the URL and builds the initial document
    pub fn into_document(self) -> Result<Document> {
        let url = parse_target(&self.url)?;
        Ok(Document::new(&url, self.title, self.description, self.capture))
    }
}

/// How a request ended
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Persisted; `indexed` is false if only the store accepted it
    Finalized { document: Document, indexed: bool },
    /// Dropped at `stage`
    Failed {
        url: String,
        stage: AcquireState,
        reason: String,
    },
}

impl Outcome {
    pub fn is_finalized(&self) -> bool {
        matches!(self, Outcome::Finalized { .. })
    }

    pub fn document(&self) -> Option<&Document> {
        match self {
            Outcome::Finalized { document, .. } => Some(document),
            Outcome::Failed { .. } => None,
        }
    }
}

/// Handle to an accepted request
#[derive(Debug)]
pub struct Submitted {
    /// Identifier of the requested URL; redirects may change the stored one
    pub id: String,
    pub handle: JoinHandle<Outcome>,
}

/// Runs scrape requests
#[derive(Clone)]
pub struct Acquirer {
    client: Client,
    catalog: Arc<Catalog>,
    pdf: PdfExtractor,
    in_flight: InFlight,
}

impl Acquirer {
    pub fn new(config: &FetchConfig, catalog: Arc<Catalog>, in_flight: InFlight) -> Result<Self> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(
            client,
            catalog,
            PdfExtractor::from_config(config),
            in_flight,
        ))
    }

    pub fn with_client(
        client: Client,
        catalog: Arc<Catalog>,
        pdf: PdfExtractor,
        in_flight: InFlight,
    ) -> Self {
        Self {
            client,
            catalog,
            pdf,
            in_flight,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Validates a request and starts its pipeline in a new task
    ///
    /// Malformed URLs are rejected before anything is fetched, and no request
    /// is accepted once shutdown has begun.
    pub fn submit(&self, request: ScrapeRequest) -> Result<Submitted> {
        let doc = request.into_document()?;
        let guard = self.in_flight.enter().ok_or(ZenoError::ShuttingDown)?;

        tracing::info!("Scraping {} (capture: {})", doc.url, doc.capture_requested);
        let id = doc.id.clone();
        let acquirer = self.clone();
        let handle = tokio::spawn(async move {
            let outcome = acquirer.acquire(doc).await;
            drop(guard);
            outcome
        });

        Ok(Submitted { id, handle })
    }

    /// Runs the whole pipeline for one document
    pub async fn acquire(&self, doc: Document) -> Outcome {
        let mut run = Run {
            state: AcquireState::Submitted,
            doc,
        };

        match self.run_pipeline(&mut run).await {
            Ok(indexed) => {
                tracing::info!("Parsed: {}", run.doc);
                Outcome::Finalized {
                    document: run.doc,
                    indexed,
                }
            }
            Err(e) => {
                let stage = run.state;
                if let Err(transition) = run.advance(AcquireState::Failed) {
                    tracing::error!("{}", transition);
                }
                tracing::warn!("Dropping {} at {}: {}", run.doc.url, stage, e);
                Outcome::Failed {
                    url: run.doc.url,
                    stage,
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn run_pipeline(&self, run: &mut Run) -> Result<bool> {
        let url = parse_target(&run.doc.url)?;

        run.advance(AcquireState::Requested)?;
        let response = fetch(&self.client, &url, run.doc.capture_requested).await?;
        if response.final_url != url {
            tracing::debug!("{} redirected to {}", url, response.final_url);
        }
        run.doc.set_url(&response.final_url);

        if response.was_aborted() {
            run.advance(AcquireState::Aborted)?;
        } else {
            run.advance(AcquireState::Fetched)?;
        }

        let doc_type = classify(response.final_url.path(), &response.content_type);
        run.advance(AcquireState::Classified)?;
        if !doc_type.is_known() {
            return Err(ZenoError::UnknownDocType(run.doc.url.clone()));
        }
        run.doc.doc_type = doc_type;

        if let Some(body) = &response.body {
            self.extract(&mut run.doc, &response.final_url, body).await?;
            run.advance(AcquireState::Extracted)?;
        }

        let saved = self.catalog.save_and_index(run.doc.clone()).await?;
        run.doc = saved.document;
        run.advance(AcquireState::Finalized)?;
        Ok(saved.indexed)
    }

    async fn extract(&self, doc: &mut Document, url: &Url, body: &[u8]) -> Result<()> {
        match doc.doc_type {
            DocType::Html => extract_html(doc, body),
            DocType::Pdf => {
                let text = self.pdf.extract(url, body, doc.capture_requested).await?;
                doc.content = text.content;
                doc.fill_title(&text.title);
            }
            DocType::Unknown => return Err(ZenoError::UnknownDocType(doc.url.clone())),
        }
        Ok(())
    }
}

/// Pipeline position and the document being built
struct Run {
    state: AcquireState,
    doc: Document,
}

impl Run {
    fn advance(&mut self, next: AcquireState) -> Result<()> {
        self.state.advance(next)?;
        tracing::debug!("{} -> {}", self.doc.url, next);
        Ok(())
    }
}

fn extract_html(doc: &mut Document, body: &[u8]) {
    let html = Html::parse_document(&String::from_utf8_lossy(body));
    if doc.capture_requested {
        doc.content = extract_text(&html);
    }
    doc.fill_title(&extract_title(&html));
}

/// Parses a scrape target, accepting absolute http(s) URLs only
fn parse_target(raw: &str) -> Result<Url> {
    let invalid = |reason: &str| ZenoError::InvalidUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("only http and https are supported"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    Ok(url)
}
