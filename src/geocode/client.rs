use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use std::time::{Duration, Instant};
use tracing::debug;

use super::{GeocodeError, Geocoder, Provider, ProviderResult};
use crate::config::ProviderSettings;
use crate::fetch::auth::UrlParam;
use crate::fetch::{BasicClient, HttpClient, fetch_json};

/// Sends one GET per lookup to a provider's endpoint, with the API key added
/// by a [`UrlParam`] wrapper around `C`.
pub struct GeocodingClient<C> {
    provider: Provider,
    base_url: Url,
    http: UrlParam<C>,
}

impl<C: HttpClient> GeocodingClient<C> {
    pub fn new(provider: Provider, settings: &ProviderSettings, inner: C) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url)
            .with_context(|| format!("invalid {provider} base URL '{}'", settings.base_url))?;

        Ok(Self {
            provider,
            base_url,
            http: UrlParam::new(inner, provider.key_param(), settings.api_key.clone()),
        })
    }

    fn request_url(&self, address: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .append_pair(self.provider.query_param(), address);
        url
    }
}

impl GeocodingClient<BasicClient> {
    /// A client over a [`BasicClient`] whose requests give up after `timeout`.
    pub fn with_timeout(
        provider: Provider,
        settings: &ProviderSettings,
        timeout: Duration,
    ) -> Result<Self> {
        Self::new(provider, settings, BasicClient::with_timeout(timeout)?)
    }
}

#[async_trait]
impl<C: HttpClient> Geocoder for GeocodingClient<C> {
    fn provider(&self) -> Provider {
        self.provider
    }

    #[tracing::instrument(skip(self), fields(provider = %self.provider))]
    async fn geocode(&self, address: &str) -> Result<ProviderResult, GeocodeError> {
        let url = self.request_url(address);

        let start = Instant::now();
        let body = fetch_json(&self.http, url).await?;
        let latency = start.elapsed();

        let fields = self
            .provider
            .extract(&body)
            .ok_or(GeocodeError::NoResults)?;
        debug!(latency_ms = latency.as_millis() as u64, ?fields, "Lookup succeeded");

        Ok(ProviderResult { fields, latency })
    }
}
