//! Per-record comparison of provider output against ground truth.

use serde::{Deserialize, Serialize};

use crate::geocode::{ExtractedFields, Provider, ProviderResult};
use crate::loader::AddressRecord;

/// One line of the detailed comparison report. Provider columns are empty
/// when the lookup failed or the field was missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub input_address: String,
    pub truth_state: String,
    pub truth_country: String,
    pub truth_postcode: String,
    pub geoapify_state: Option<String>,
    pub geoapify_country: Option<String>,
    pub geoapify_postcode: Option<String>,
    pub opencage_state: Option<String>,
    pub opencage_country: Option<String>,
    pub opencage_postcode: Option<String>,
}

/// Borrowed view of one provider's columns in a [`ComparisonRow`].
#[derive(Debug, Clone, Copy)]
pub struct ProviderColumns<'a> {
    pub state: Option<&'a str>,
    pub country: Option<&'a str>,
    pub postcode: Option<&'a str>,
}

/// Outcome of checking one provider's fields for one record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldChecks {
    pub country: bool,
    pub state: bool,
    pub postcode: bool,
}

impl FieldChecks {
    pub fn all_correct(&self) -> bool {
        self.country && self.state && self.postcode
    }
}

impl ComparisonRow {
    pub fn new(
        record: &AddressRecord,
        geoapify: Option<&ProviderResult>,
        opencage: Option<&ProviderResult>,
    ) -> Self {
        let geo = fields_of(geoapify);
        let oc = fields_of(opencage);

        Self {
            input_address: record.address.clone(),
            truth_state: record.state.clone(),
            truth_country: record.country.clone(),
            truth_postcode: record.postcode.clone(),
            geoapify_state: geo.state,
            geoapify_country: geo.country,
            geoapify_postcode: geo.postcode,
            opencage_state: oc.state,
            opencage_country: oc.country,
            opencage_postcode: oc.postcode,
        }
    }

    pub fn columns(&self, provider: Provider) -> ProviderColumns<'_> {
        match provider {
            Provider::Geoapify => ProviderColumns {
                state: self.geoapify_state.as_deref(),
                country: self.geoapify_country.as_deref(),
                postcode: self.geoapify_postcode.as_deref(),
            },
            Provider::OpenCage => ProviderColumns {
                state: self.opencage_state.as_deref(),
                country: self.opencage_country.as_deref(),
                postcode: self.opencage_postcode.as_deref(),
            },
        }
    }

    /// Checks `provider`'s country, state and postcode against ground truth.
    pub fn check(&self, provider: Provider) -> FieldChecks {
        let cols = self.columns(provider);
        FieldChecks {
            country: text_matches(cols.country, &self.truth_country),
            state: text_matches(cols.state, &self.truth_state),
            postcode: postcode_matches(cols.postcode, &self.truth_postcode),
        }
    }
}

fn fields_of(result: Option<&ProviderResult>) -> ExtractedFields {
    result.map(|r| r.fields.clone()).unwrap_or_default()
}

/// Case-insensitive equality. A missing candidate never matches.
pub fn text_matches(candidate: Option<&str>, truth: &str) -> bool {
    candidate.is_some_and(|c| c.to_lowercase() == truth.to_lowercase())
}

/// Like [`text_matches`] but ignoring all whitespace on both sides.
pub fn postcode_matches(candidate: Option<&str>, truth: &str) -> bool {
    candidate.is_some_and(|c| normalize_postcode(c) == normalize_postcode(truth))
}

fn normalize_postcode(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Round-trip times for one record where both providers answered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencySample {
    pub address: String,
    pub geoapify_latency: f64,
    pub opencage_latency: f64,
}

impl LatencySample {
    pub fn new(address: &str, geoapify: &ProviderResult, opencage: &ProviderResult) -> Self {
        Self {
            address: address.to_string(),
            geoapify_latency: geoapify.latency.as_secs_f64(),
            opencage_latency: opencage.latency.as_secs_f64(),
        }
    }

    pub fn latency(&self, provider: Provider) -> f64 {
        match provider {
            Provider::Geoapify => self.geoapify_latency,
            Provider::OpenCage => self.opencage_latency,
        }
    }
}
