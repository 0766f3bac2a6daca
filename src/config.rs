//! Run configuration.
//!
//! [`BenchConfig`] gathers every knob of a benchmark run into one value that
//! the CLI builds and hands to the loader, the geocoding clients and the
//! reporter. Nothing in the library reads globals or environment variables
//! apart from [`ProviderSettings::from_env`].

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::geocode::Provider;

pub const DEFAULT_MAX_ROWS: usize = 10;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_COUNTRIES: &[&str] = &["US", "CA"];
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Loader settings: which rows survive and how many are kept.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub allowed_countries: Vec<String>,
    pub max_rows: usize,
    pub seed: u64,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            allowed_countries: DEFAULT_COUNTRIES.iter().map(|c| c.to_string()).collect(),
            max_rows: DEFAULT_MAX_ROWS,
            seed: DEFAULT_SEED,
        }
    }
}

/// Per-provider endpoint, credential and call spacing.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: String,
    pub min_interval: Duration,
}

impl ProviderSettings {
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: provider.default_base_url().to_string(),
            min_interval: provider.default_min_interval(),
        }
    }

    /// Reads the API key from the provider's environment variable
    /// (`GEOAPIFY_API_KEY` or `OPENCAGE_API_KEY`).
    pub fn from_env(provider: Provider) -> Result<Self> {
        let var = provider.key_env_var();
        let key = std::env::var(var).with_context(|| format!("{var} must be set"))?;
        Ok(Self::new(provider, key))
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        self
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }
}

/// Output file locations for the three reports.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub results: PathBuf,
    pub latency: PathBuf,
    pub summary: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            results: PathBuf::from("api_comparison_results.csv"),
            latency: PathBuf::from("latency_metrics.csv"),
            summary: PathBuf::from("accuracy_summary.csv"),
        }
    }
}

/// Everything a benchmark run needs.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub input: PathBuf,
    pub outputs: OutputPaths,
    pub loader: LoaderConfig,
    pub geoapify: ProviderSettings,
    pub opencage: ProviderSettings,
    pub timeout: Duration,
}

impl BenchConfig {
    pub fn provider(&self, provider: Provider) -> &ProviderSettings {
        match provider {
            Provider::Geoapify => &self.geoapify,
            Provider::OpenCage => &self.opencage,
        }
    }
}
