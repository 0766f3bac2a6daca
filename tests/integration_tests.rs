use async_trait::async_trait;
use geocode_bench::bench::{Benchmark, Lane};
use geocode_bench::config::{LoaderConfig, OutputPaths, ProviderSettings};
use geocode_bench::fetch::HttpClient;
use geocode_bench::geocode::{GeocodingClient, Provider};
use geocode_bench::loader::load_addresses;
use geocode_bench::output::{read_comparison, write_report};
use geocode_bench::rate_limit::{IntervalLimiter, ManualClock};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Serves canned responses keyed by the address in the request; anything
/// unscripted gets a 500.
struct ScriptedClient {
    query_param: &'static str,
    responses: HashMap<String, String>,
}

impl ScriptedClient {
    fn new(provider: Provider, responses: &[(&str, serde_json::Value)]) -> Self {
        Self {
            query_param: provider.query_param(),
            responses: responses
                .iter()
                .map(|(addr, body)| (addr.to_string(), body.to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl HttpClient for ScriptedClient {
    async fn execute(&self, req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let address = req
            .url()
            .query_pairs()
            .find(|(k, _)| k == self.query_param)
            .map(|(_, v)| v.into_owned())
            .unwrap_or_default();

        let resp = match self.responses.get(&address) {
            Some(body) => http::Response::builder().status(200).body(body.clone()),
            None => http::Response::builder()
                .status(500)
                .body("internal error".to_string()),
        };
        Ok(reqwest::Response::from(resp.unwrap()))
    }
}

fn geoapify(state: &str, country: &str, postcode: &str) -> serde_json::Value {
    serde_json::json!({
        "features": [{"properties": {"state_code": state, "country_code": country, "postcode": postcode}}]
    })
}

fn opencage(state: &str, country: &str, postcode: &str) -> serde_json::Value {
    serde_json::json!({
        "results": [{"components": {"state_code": state, "country_code": country, "postcode": postcode}}]
    })
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(name)
}

fn output_paths(prefix: &str) -> OutputPaths {
    OutputPaths {
        results: temp_path(&format!("{prefix}_results.csv")),
        latency: temp_path(&format!("{prefix}_latency.csv")),
        summary: temp_path(&format!("{prefix}_summary.csv")),
    }
}

fn benchmark(
    geo: ScriptedClient,
    oc: ScriptedClient,
    clock: Arc<ManualClock>,
) -> Benchmark<GeocodingClient<ScriptedClient>, Arc<ManualClock>> {
    let geo_settings = ProviderSettings::new(Provider::Geoapify, "geo-key");
    let oc_settings = ProviderSettings::new(Provider::OpenCage, "oc-key");

    Benchmark::new(
        Lane::new(
            GeocodingClient::new(Provider::Geoapify, &geo_settings, geo).unwrap(),
            IntervalLimiter::new(geo_settings.min_interval, clock.clone()),
        ),
        Lane::new(
            GeocodingClient::new(Provider::OpenCage, &oc_settings, oc).unwrap(),
            IntervalLimiter::new(oc_settings.min_interval, clock),
        ),
    )
}

#[tokio::test]
async fn test_full_pipeline() {
    let input = temp_path("geocode_bench_it_addresses.csv");
    fs::write(
        &input,
        "\
formatted,provinceCode,countryCodeV2,zip
\"['9 Rodeo Dr', 'Beverly Hills CA 90210']\",CA,US,90210
\"['10 Downing St', 'London']\",LND,GB,SW1A 2AA
\"['1 Penn Plaza', 'New York NY 10001']\",NY,US,10001
\"['broken\",ON,CA,K1A 0B1
\"['290 Bremner Blvd', 'Toronto ON M5V 2T6']\",ON,CA,M5V 2T6
",
    )
    .unwrap();

    let records = load_addresses(&input, &LoaderConfig::default()).unwrap();
    assert_eq!(records.len(), 3);

    let a1 = "9 Rodeo Dr, Beverly Hills CA 90210";
    let a2 = "1 Penn Plaza, New York NY 10001";
    let a3 = "290 Bremner Blvd, Toronto ON M5V 2T6";

    // Geoapify: right on record 1, a server error on record 2, wrong
    // province/postcode on record 3.
    let geo = ScriptedClient::new(
        Provider::Geoapify,
        &[(a1, geoapify("CA", "us", "90210")), (a3, geoapify("QC", "ca", "H2X 1Y4"))],
    );
    // OpenCage: right country everywhere, wrong state and postcode.
    let oc = ScriptedClient::new(
        Provider::OpenCage,
        &[
            (a1, opencage("NV", "us", "89101")),
            (a2, opencage("NJ", "us", "07030")),
            (a3, opencage("BC", "ca", "V6B 1A1")),
        ],
    );

    let clock = Arc::new(ManualClock::new());
    let run = benchmark(geo, oc, clock.clone()).run(&records).await;

    // OpenCage calls are spaced one second apart; no real time passes.
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(1); 2]);

    assert_eq!(run.rows.len(), 3);
    assert!(run.rows[1].geoapify_state.is_none());
    assert_eq!(run.rows[1].opencage_state.as_deref(), Some("NJ"));
    assert_eq!(run.latencies.len(), 2);

    let paths = output_paths("geocode_bench_it_full");
    let summary = write_report(&paths, &run).unwrap();

    assert_eq!(summary.total_rows, 3);
    assert!((summary.geoapify_correct_all - 100.0 / 3.0).abs() < 1e-9);
    assert_eq!(summary.opencage_correct_country, 100.0);
    assert_eq!(summary.opencage_correct_all, 0.0);

    let written = read_comparison(&paths.results).unwrap();
    assert_eq!(written, run.rows);

    let latency = fs::read_to_string(&paths.latency).unwrap();
    assert_eq!(latency.lines().count(), 3);
    assert!(!latency.contains("NaN"));

    for p in [&input, &paths.results, &paths.latency, &paths.summary] {
        fs::remove_file(p).unwrap();
    }
}

#[tokio::test]
async fn test_no_valid_records_still_writes_reports() {
    let input = temp_path("geocode_bench_it_empty.csv");
    fs::write(
        &input,
        "\
formatted,provinceCode,countryCodeV2,zip
\"['Unter den Linden 1', 'Berlin']\",BE,DE,10117
",
    )
    .unwrap();

    let records = load_addresses(&input, &LoaderConfig::default()).unwrap();
    assert!(records.is_empty());

    let clock = Arc::new(ManualClock::new());
    let geo = ScriptedClient::new(Provider::Geoapify, &[]);
    let oc = ScriptedClient::new(Provider::OpenCage, &[]);
    let run = benchmark(geo, oc, clock).run(&records).await;

    let paths = output_paths("geocode_bench_it_empty");
    let summary = write_report(&paths, &run).unwrap();

    assert_eq!(summary.total_rows, 0);
    assert!(summary.geoapify_correct_all.is_nan());
    assert!(summary.opencage_correct_country.is_nan());
    assert!(paths.results.exists());
    assert!(fs::read_to_string(&paths.latency).unwrap().contains("NaN"));

    for p in [&input, &paths.results, &paths.latency, &paths.summary] {
        fs::remove_file(p).unwrap();
    }
}

#[tokio::test]
async fn test_every_call_failing_keeps_all_rows() {
    let input = temp_path("geocode_bench_it_failing.csv");
    fs::write(
        &input,
        "\
formatted,provinceCode,countryCodeV2,zip
\"['1 Main St', 'Springfield IL']\",IL,US,62701
\"['2 Main St', 'Springfield IL']\",IL,US,62702
",
    )
    .unwrap();

    let records = load_addresses(&input, &LoaderConfig::default()).unwrap();
    let clock = Arc::new(ManualClock::new());
    let run = benchmark(
        ScriptedClient::new(Provider::Geoapify, &[]),
        ScriptedClient::new(Provider::OpenCage, &[]),
        clock,
    )
    .run(&records)
    .await;

    assert_eq!(run.rows.len(), 2);
    assert!(run.latencies.is_empty());
    assert!(run.rows.iter().all(|r| r.geoapify_country.is_none() && r.opencage_country.is_none()));

    fs::remove_file(&input).unwrap();
}
