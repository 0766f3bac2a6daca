//! Geocoding clients for the providers under test.
//!
//! [`Geocoder`] is the seam the benchmark driver works against;
//! [`GeocodingClient`] implements it over any [`HttpClient`](crate::fetch::HttpClient).

mod client;
mod provider;

pub use client::GeocodingClient;
pub use provider::{ExtractedFields, Provider};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::fetch::FetchError;

/// Fields extracted from one successful lookup, plus its round-trip time.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResult {
    pub fields: ExtractedFields,
    pub latency: Duration,
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("no results returned")]
    NoResults,
}

/// Resolves a free-text address through one provider.
#[async_trait]
pub trait Geocoder: Send + Sync {
    fn provider(&self) -> Provider;

    async fn geocode(&self, address: &str) -> Result<ProviderResult, GeocodeError>;
}
