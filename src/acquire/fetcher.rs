//! One-hop HTTP fetcher
//!
//! Redirects are followed, but links inside the fetched content never are.
//! When the caller does not want the body, the response is dropped as soon as
//! its headers arrive so the body is never transferred.

use crate::acquire::error::FetchError;
use crate::config::FetchConfig;
use reqwest::header::CONTENT_TYPE;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// What a fetch produced
#[derive(Debug)]
pub struct FetchedResponse {
    /// URL after redirects
    pub final_url: Url,
    pub status: u16,
    /// `Content-Type` header, empty when absent
    pub content_type: String,
    /// `None` when the body was deliberately not downloaded
    pub body: Option<Vec<u8>>,
}

impl FetchedResponse {
    pub fn was_aborted(&self) -> bool {
        self.body.is_none()
    }
}

/// Builds the HTTP client shared by all fetches
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(config.timeout())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a single resource
///
/// Non-2xx responses are errors. With `capture` unset only the headers are
/// read.
pub async fn fetch(
    client: &Client,
    url: &Url,
    capture: bool,
) -> Result<FetchedResponse, FetchError> {
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    let final_url = response.url().clone();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: final_url.to_string(),
            status: status.as_u16(),
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let body = if capture {
        Some(response.bytes().await?.to_vec())
    } else {
        tracing::debug!("Not downloading body of {}", final_url);
        drop(response);
        None
    };

    Ok(FetchedResponse {
        final_url,
        status: status.as_u16(),
        content_type,
        body,
    })
}
