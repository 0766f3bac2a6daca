//! Report writing.
//!
//! Three CSV files come out of a run: the detailed per-address comparison,
//! per-provider latency, and the one-row accuracy summary. Each file is
//! created or truncated; a run with no rows still gets headers.

use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use tracing::{debug, info};

use crate::bench::BenchmarkRun;
use crate::compare::ComparisonRow;
use crate::config::OutputPaths;
use crate::stats::{LatencyStats, MetricsSummary};

const COMPARISON_COLUMNS: [&str; 10] = [
    "input_address",
    "truth_state",
    "truth_country",
    "truth_postcode",
    "geoapify_state",
    "geoapify_country",
    "geoapify_postcode",
    "opencage_state",
    "opencage_country",
    "opencage_postcode",
];

/// Logs a serializable report as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn write_rows<'a, T: Serialize + 'a>(
    path: &Path,
    rows: impl IntoIterator<Item = &'a T>,
    header: Option<&[&str]>,
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = WriterBuilder::new()
        .has_headers(header.is_none())
        .from_writer(file);

    if let Some(header) = header {
        writer.write_record(header)?;
    }
    let mut count = 0usize;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = count, "CSV written");
    Ok(())
}

/// Writes the per-address comparison report.
pub fn write_comparison(path: &Path, rows: &[ComparisonRow]) -> Result<()> {
    if rows.is_empty() {
        write_rows(
            path,
            std::iter::empty::<&ComparisonRow>(),
            Some(&COMPARISON_COLUMNS[..]),
        )
    } else {
        write_rows(path, rows, None)
    }
}

pub fn write_latency(path: &Path, stats: &[LatencyStats]) -> Result<()> {
    write_rows(path, stats, None)
}

pub fn write_summary(path: &Path, summary: &MetricsSummary) -> Result<()> {
    write_rows(path, [summary], None)
}

/// Reads a comparison report written by [`write_comparison`].
pub fn read_comparison(path: &Path) -> Result<Vec<ComparisonRow>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rdr = csv::Reader::from_reader(file);

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: ComparisonRow = result?;
        rows.push(row);
    }
    Ok(rows)
}

/// Derives the latency and accuracy reports from `run` and writes all three
/// files. Returns the accuracy summary for logging.
pub fn write_report(paths: &OutputPaths, run: &BenchmarkRun) -> Result<MetricsSummary> {
    let summary = MetricsSummary::from_rows(&run.rows);
    let latency = LatencyStats::for_all(&run.latencies);

    write_comparison(&paths.results, &run.rows)?;
    write_latency(&paths.latency, &latency)?;
    write_summary(&paths.summary, &summary)?;

    info!(
        results = %paths.results.display(),
        latency = %paths.latency.display(),
        summary = %paths.summary.display(),
        "Reports written"
    );
    Ok(summary)
}
