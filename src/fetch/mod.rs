mod basic;
mod client;
pub mod auth;
#[cfg(test)]
pub(crate) mod mock;

pub use basic::BasicClient;
pub use client::HttpClient;

use reqwest::{StatusCode, Url};
use thiserror::Error;

/// Why a single GET could not produce a JSON document.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("malformed JSON payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Transport errors are stored without their URL, which carries the API key.
impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Request(e.without_url())
    }
}

/// Issues a GET to `url` and decodes the body as JSON.
///
/// # Errors
///
/// Returns [`FetchError::Status`] for any non-2xx response, carrying the
/// response body for diagnostics.
pub async fn fetch_json<C: HttpClient>(
    client: &C,
    url: Url,
) -> Result<serde_json::Value, FetchError> {
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(FetchError::Status { status, body });
    }

    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
