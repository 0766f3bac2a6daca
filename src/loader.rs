//! Address dataset loading.
//!
//! Reads the ground-truth CSV, keeps rows from the allowed countries whose
//! `formatted` column yields a usable address, and samples a reproducible
//! subset when the dataset is larger than the configured cap.

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::LoaderConfig;

/// One input address with its ground-truth jurisdiction, country and postcode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressRecord {
    pub address: String,
    pub state: String,
    pub country: String,
    pub postcode: String,
}

/// Columns of interest in the input dataset. Everything else is ignored.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    formatted: Option<String>,
    #[serde(rename = "provinceCode", default)]
    province_code: Option<String>,
    #[serde(rename = "countryCodeV2", default)]
    country_code: Option<String>,
    #[serde(default)]
    zip: Option<String>,
}

#[derive(Debug, Default)]
struct LoadCounts {
    rows: usize,
    unreadable: usize,
    wrong_country: usize,
    empty_address: usize,
    missing_truth: usize,
}

/// Loads and samples address records from the CSV file at `path`.
///
/// # Errors
///
/// Fails only if the file cannot be opened; bad rows are skipped.
#[tracing::instrument(skip(path, config), fields(path = %path.display()))]
pub fn load_addresses(path: &Path, config: &LoaderConfig) -> Result<Vec<AddressRecord>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.display()))?;
    Ok(read_addresses(file, config))
}

/// Same as [`load_addresses`] over any reader.
pub fn read_addresses<R: Read>(reader: R, config: &LoaderConfig) -> Vec<AddressRecord> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut counts = LoadCounts::default();
    let mut records = Vec::new();

    for result in rdr.deserialize::<RawRow>() {
        counts.rows += 1;
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                warn!(line = error_line(&e), error = %e, "Skipping unreadable row");
                counts.unreadable += 1;
                continue;
            }
        };

        let Some(country) = non_blank(row.country_code) else {
            counts.missing_truth += 1;
            continue;
        };
        if !config.allowed_countries.iter().any(|c| *c == country) {
            counts.wrong_country += 1;
            continue;
        }

        let address = row
            .formatted
            .as_deref()
            .map(format_address)
            .unwrap_or_default();
        if address.is_empty() {
            counts.empty_address += 1;
            continue;
        }

        let (Some(state), Some(postcode)) = (non_blank(row.province_code), non_blank(row.zip))
        else {
            counts.missing_truth += 1;
            continue;
        };

        records.push(AddressRecord {
            address,
            state,
            country,
            postcode,
        });
    }

    info!(
        rows = counts.rows,
        valid = records.len(),
        unreadable = counts.unreadable,
        wrong_country = counts.wrong_country,
        empty_address = counts.empty_address,
        missing_truth = counts.missing_truth,
        "Address dataset read"
    );

    sample_records(records, config.max_rows, config.seed)
}

/// 1-based line in the input file where the failing record starts.
fn error_line(e: &csv::Error) -> Option<u64> {
    e.position().map(|p| p.line())
}

/// Keeps at most `max_rows` records, chosen by a `seed`ed RNG. The kept
/// records stay in their original order.
pub fn sample_records(records: Vec<AddressRecord>, max_rows: usize, seed: u64) -> Vec<AddressRecord> {
    if records.len() <= max_rows {
        return records;
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, records.len(), max_rows).into_vec();
    picked.sort_unstable();
    debug!(from = records.len(), to = max_rows, seed, "Sampling records");

    let mut picked = picked.into_iter().peekable();
    records
        .into_iter()
        .enumerate()
        .filter_map(|(i, record)| {
            if picked.peek() == Some(&i) {
                picked.next();
                Some(record)
            } else {
                None
            }
        })
        .collect()
}

/// Turns a serialized list of address lines into a single `", "`-joined
/// string. Accepts JSON arrays and Python-style list literals; anything that
/// does not parse yields an empty string.
pub fn format_address(raw: &str) -> String {
    parse_address_lines(raw)
        .map(|lines| lines.join(", "))
        .unwrap_or_default()
}

fn parse_address_lines(raw: &str) -> Option<Vec<String>> {
    if let Ok(lines) = serde_json::from_str::<Vec<String>>(raw) {
        return Some(lines);
    }
    parse_list_literal(raw)
}

/// Parses `['a', "b", ...]` with either quote style and backslash escapes.
fn parse_list_literal(raw: &str) -> Option<Vec<String>> {
    let inner = raw.trim().strip_prefix('[')?.strip_suffix(']')?;
    let mut chars = inner.chars().peekable();
    let mut items = Vec::new();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let quote = match chars.next() {
            None => break,
            Some(q @ ('\'' | '"')) => q,
            Some(_) => return None,
        };

        let mut item = String::new();
        loop {
            match chars.next()? {
                '\\' => item.push(match chars.next()? {
                    'n' => '\n',
                    't' => '\t',
                    other => other,
                }),
                c if c == quote => break,
                c => item.push(c),
            }
        }
        items.push(item);

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        match chars.next() {
            None => break,
            Some(',') => continue,
            Some(_) => return None,
        }
    }

    Some(items)
}

fn non_blank(value: Option<String>) -> Option<String> {
    let value = value?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
