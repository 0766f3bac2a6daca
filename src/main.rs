//! CLI entry point for the geocoding benchmark.
//!
//! Provides subcommands for running the full Geoapify/OpenCage comparison,
//! geocoding a single address, and re-scoring an existing comparison file.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use geocode_bench::{
    bench::{Benchmark, Lane},
    config::{
        BenchConfig, DEFAULT_MAX_ROWS, DEFAULT_SEED, DEFAULT_TIMEOUT, LoaderConfig, OutputPaths,
        ProviderSettings,
    },
    fetch::BasicClient,
    geocode::{Geocoder, GeocodingClient, Provider},
    loader::load_addresses,
    output::{print_json, read_comparison, write_report, write_summary},
    rate_limit::IntervalLimiter,
    stats::MetricsSummary,
};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "geocode_bench")]
#[command(about = "Benchmark Geoapify and OpenCage against ground-truth addresses", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Geocode a sample of the dataset through both providers and write reports
    Run {
        /// Address dataset CSV
        #[arg(short, long, default_value = "addresses.csv")]
        input: PathBuf,

        /// Detailed per-address comparison CSV
        #[arg(long, default_value = "api_comparison_results.csv")]
        results_output: PathBuf,

        /// Per-provider latency CSV
        #[arg(long, default_value = "latency_metrics.csv")]
        latency_output: PathBuf,

        /// Accuracy summary CSV
        #[arg(long, default_value = "accuracy_summary.csv")]
        summary_output: PathBuf,

        /// Maximum number of addresses to geocode
        #[arg(short = 'n', long, default_value_t = DEFAULT_MAX_ROWS)]
        max_rows: usize,

        /// Seed for the address sample
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,

        /// Country codes to keep
        #[arg(long, value_delimiter = ',', default_value = "US,CA")]
        countries: Vec<String>,

        /// Minimum milliseconds between Geoapify calls
        #[arg(long, default_value_t = 0)]
        geoapify_interval_ms: u64,

        /// Minimum milliseconds between OpenCage calls
        #[arg(long, default_value_t = 1000)]
        opencage_interval_ms: u64,

        /// Override the Geoapify endpoint
        #[arg(long)]
        geoapify_url: Option<String>,

        /// Override the OpenCage endpoint
        #[arg(long)]
        opencage_url: Option<String>,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },
    /// Geocode one address with one provider
    Geocode {
        /// Free-text address
        #[arg(value_name = "ADDRESS")]
        address: String,

        #[arg(short, long, value_enum)]
        provider: Provider,

        /// Override the provider endpoint
        #[arg(long)]
        url: Option<String>,

        /// Request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
        timeout_secs: u64,
    },
    /// Recompute the accuracy summary from an existing comparison CSV
    Score {
        #[arg(short, long, default_value = "api_comparison_results.csv")]
        results: PathBuf,

        #[arg(short, long, default_value = "accuracy_summary.csv")]
        summary_output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/geocode_bench.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("geocode_bench.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            results_output,
            latency_output,
            summary_output,
            max_rows,
            seed,
            countries,
            geoapify_interval_ms,
            opencage_interval_ms,
            geoapify_url,
            opencage_url,
            timeout_secs,
        } => {
            let config = BenchConfig {
                input,
                outputs: OutputPaths {
                    results: results_output,
                    latency: latency_output,
                    summary: summary_output,
                },
                loader: LoaderConfig {
                    allowed_countries: countries,
                    max_rows,
                    seed,
                },
                geoapify: ProviderSettings::from_env(Provider::Geoapify)?
                    .with_base_url(geoapify_url)
                    .with_min_interval(Duration::from_millis(geoapify_interval_ms)),
                opencage: ProviderSettings::from_env(Provider::OpenCage)?
                    .with_base_url(opencage_url)
                    .with_min_interval(Duration::from_millis(opencage_interval_ms)),
                timeout: Duration::from_secs(timeout_secs),
            };
            run_benchmark(&config).await?;
        }
        Commands::Geocode {
            address,
            provider,
            url,
            timeout_secs,
        } => {
            let settings = ProviderSettings::from_env(provider)?.with_base_url(url);
            let client = GeocodingClient::with_timeout(
                provider,
                &settings,
                Duration::from_secs(timeout_secs),
            )?;

            match client.geocode(&address).await {
                Ok(result) => info!(
                    %provider,
                    state = result.fields.state.as_deref().unwrap_or("-"),
                    country = result.fields.country.as_deref().unwrap_or("-"),
                    postcode = result.fields.postcode.as_deref().unwrap_or("-"),
                    latency_secs = result.latency.as_secs_f64(),
                    "Lookup result"
                ),
                Err(e) => {
                    error!(%provider, error = %e, "Lookup failed");
                    return Err(e.into());
                }
            }
        }
        Commands::Score {
            results,
            summary_output,
        } => {
            let rows = read_comparison(&results)?;
            let summary = MetricsSummary::from_rows(&rows);
            write_summary(&summary_output, &summary)?;
            print_json(&summary)?;
        }
    }

    Ok(())
}

/// Builds the client and limiter for one provider.
fn lane(provider: Provider, config: &BenchConfig) -> Result<Lane<GeocodingClient<BasicClient>>> {
    let settings = config.provider(provider);
    let client = GeocodingClient::with_timeout(provider, settings, config.timeout)?;
    Ok(Lane::new(
        client,
        IntervalLimiter::wall_clock(settings.min_interval),
    ))
}

/// Loads the sample, geocodes it through both providers and writes all
/// three reports.
#[tracing::instrument(skip(config), fields(input = %config.input.display()))]
async fn run_benchmark(config: &BenchConfig) -> Result<()> {
    let started = Utc::now();

    info!("Loading and preparing data");
    let records = load_addresses(&config.input, &config.loader)?;

    info!(count = records.len(), "Processing addresses");
    let bench = Benchmark::new(
        lane(Provider::Geoapify, config)?,
        lane(Provider::OpenCage, config)?,
    );
    let run = bench.run(&records).await;

    info!(
        rows = run.rows.len(),
        latency_samples = run.latencies.len(),
        "Calculating metrics and saving results"
    );
    let summary = write_report(&config.outputs, &run)?;
    print_json(&summary)?;

    info!(
        started = %started,
        elapsed_secs = (Utc::now() - started).num_seconds(),
        "Comparison complete"
    );
    Ok(())
}
