//! The benchmark driver: one record at a time, Geoapify then OpenCage.

use tracing::{info, warn};

use crate::compare::{ComparisonRow, LatencySample};
use crate::geocode::{Geocoder, ProviderResult};
use crate::loader::AddressRecord;
use crate::rate_limit::{Clock, IntervalLimiter, TokioClock};

/// A geocoder paired with the limiter that paces its calls.
pub struct Lane<G, C = TokioClock> {
    geocoder: G,
    limiter: IntervalLimiter<C>,
}

impl<G: Geocoder, C: Clock> Lane<G, C> {
    pub fn new(geocoder: G, limiter: IntervalLimiter<C>) -> Self {
        Self { geocoder, limiter }
    }

    /// Looks up `address`, turning any failure into `None` after logging it.
    async fn lookup(&self, address: &str) -> Option<ProviderResult> {
        self.limiter.acquire().await;
        match self.geocoder.geocode(address).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(
                    provider = %self.geocoder.provider(),
                    address,
                    error = %e,
                    "Geocoding lookup failed"
                );
                None
            }
        }
    }
}

/// Everything gathered by a run, in input order.
#[derive(Debug, Default)]
pub struct BenchmarkRun {
    pub rows: Vec<ComparisonRow>,
    pub latencies: Vec<LatencySample>,
}

pub struct Benchmark<G, C = TokioClock> {
    geoapify: Lane<G, C>,
    opencage: Lane<G, C>,
}

impl<G: Geocoder, C: Clock> Benchmark<G, C> {
    pub fn new(geoapify: Lane<G, C>, opencage: Lane<G, C>) -> Self {
        Self { geoapify, opencage }
    }

    /// Geocodes every record through both providers. Lookup failures show up
    /// as empty provider columns; they never stop the run.
    #[tracing::instrument(skip_all, fields(records = records.len()))]
    pub async fn run(&self, records: &[AddressRecord]) -> BenchmarkRun {
        let total = records.len();
        let mut run = BenchmarkRun {
            rows: Vec::with_capacity(total),
            latencies: Vec::new(),
        };

        for (i, record) in records.iter().enumerate() {
            let geo = self.geoapify.lookup(&record.address).await;
            let oc = self.opencage.lookup(&record.address).await;

            run.rows
                .push(ComparisonRow::new(record, geo.as_ref(), oc.as_ref()));
            if let (Some(geo), Some(oc)) = (&geo, &oc) {
                run.latencies
                    .push(LatencySample::new(&record.address, geo, oc));
            }

            info!(
                address = %record.address,
                geoapify_ok = geo.is_some(),
                opencage_ok = oc.is_some(),
                "Processed {}/{}",
                i + 1,
                total
            );
        }

        run
    }
}
