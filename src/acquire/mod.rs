//! Acquisition module
//!
//! Turns a scrape request into a persisted document:
//! - one-hop fetching, optionally without the body
//! - classification by URL extension and content type
//! - HTML and PDF text extraction
//! - the per-request pipeline and in-flight tracking for shutdown

mod classifier;
mod error;
mod fetcher;
mod html;
mod inflight;
mod orchestrator;
mod pdf;
mod state;

pub use classifier::classify;
pub use error::{ExtractError, FetchError};
pub use fetcher::{build_http_client, fetch, FetchedResponse};
pub use html::{extract_text, extract_title};
pub use inflight::{InFlight, InFlightGuard};
pub use orchestrator::{Acquirer, Outcome, ScrapeRequest, Submitted};
pub use pdf::{PdfExtractor, PdfText};
pub use state::AcquireState;
