//! Accuracy and latency aggregation.
//!
//! Percentages are taken over the number of comparison rows. An empty run
//! yields NaN percentages, and an empty latency sample set yields NaN stats.

use serde::Serialize;

use crate::compare::{ComparisonRow, FieldChecks, LatencySample};
use crate::geocode::Provider;

/// Raw correct-counts for one provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProviderCounts {
    pub country: usize,
    pub state: usize,
    pub postcode: usize,
    pub all: usize,
}

impl ProviderCounts {
    pub fn add(&mut self, checks: FieldChecks) {
        self.country += usize::from(checks.country);
        self.state += usize::from(checks.state);
        self.postcode += usize::from(checks.postcode);
        self.all += usize::from(checks.all_correct());
    }
}

/// The accuracy summary row.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSummary {
    pub geoapify_correct_country: f64,
    pub geoapify_correct_state: f64,
    pub geoapify_correct_postcode: f64,
    pub geoapify_correct_all: f64,
    pub opencage_correct_country: f64,
    pub opencage_correct_state: f64,
    pub opencage_correct_postcode: f64,
    pub opencage_correct_all: f64,
    pub total_rows: usize,
}

impl MetricsSummary {
    pub fn from_rows(rows: &[ComparisonRow]) -> Self {
        let mut geo = ProviderCounts::default();
        let mut oc = ProviderCounts::default();

        for row in rows {
            geo.add(row.check(Provider::Geoapify));
            oc.add(row.check(Provider::OpenCage));
        }

        Self::from_counts(geo, oc, rows.len())
    }

    pub fn from_counts(geo: ProviderCounts, oc: ProviderCounts, total_rows: usize) -> Self {
        MetricsSummary {
            geoapify_correct_country: Self::pct(geo.country, total_rows),
            geoapify_correct_state: Self::pct(geo.state, total_rows),
            geoapify_correct_postcode: Self::pct(geo.postcode, total_rows),
            geoapify_correct_all: Self::pct(geo.all, total_rows),
            opencage_correct_country: Self::pct(oc.country, total_rows),
            opencage_correct_state: Self::pct(oc.state, total_rows),
            opencage_correct_postcode: Self::pct(oc.postcode, total_rows),
            opencage_correct_all: Self::pct(oc.all, total_rows),
            total_rows,
        }
    }

    /// `part / total * 100`, or NaN when `total` is zero.
    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            f64::NAN
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }
}

/// Latency statistics for one provider, in seconds.
#[derive(Debug, Clone, Serialize)]
pub struct LatencyStats {
    pub api: Provider,
    pub avg_latency: f64,
    pub min_latency: f64,
    pub max_latency: f64,
}

impl LatencyStats {
    /// Min, mean and max over `samples`; all NaN when there are none.
    pub fn from_samples(api: Provider, samples: &[LatencySample]) -> Self {
        if samples.is_empty() {
            return LatencyStats {
                api,
                avg_latency: f64::NAN,
                min_latency: f64::NAN,
                max_latency: f64::NAN,
            };
        }

        let values = samples.iter().map(|s| s.latency(api));
        let (sum, min, max) = values.fold(
            (0.0, f64::INFINITY, f64::NEG_INFINITY),
            |(sum, min, max), v| (sum + v, min.min(v), max.max(v)),
        );

        LatencyStats {
            api,
            avg_latency: sum / samples.len() as f64,
            min_latency: min,
            max_latency: max,
        }
    }

    /// One entry per provider, in [`Provider::ALL`] order.
    pub fn for_all(samples: &[LatencySample]) -> Vec<Self> {
        Provider::ALL
            .iter()
            .map(|&p| Self::from_samples(p, samples))
            .collect()
    }
}
