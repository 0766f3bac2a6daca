//! The two geocoding services under test and their response shapes.

use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// A geocoding service. Each variant knows its endpoint, its query-parameter
/// names and where the fields of interest live in its JSON payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Geoapify,
    #[value(name = "opencage")]
    OpenCage,
}

/// State, country and postcode as reported by a provider. Any of them may be
/// missing from a response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    pub state: Option<String>,
    pub country: Option<String>,
    pub postcode: Option<String>,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Geoapify, Provider::OpenCage];

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Geoapify => "geoapify",
            Provider::OpenCage => "opencage",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Geoapify => "https://api.geoapify.com/v1/geocode/search",
            Provider::OpenCage => "https://api.opencagedata.com/geocode/v1/json",
        }
    }

    /// Query parameter carrying the free-text address.
    pub fn query_param(&self) -> &'static str {
        match self {
            Provider::Geoapify => "text",
            Provider::OpenCage => "q",
        }
    }

    /// Query parameter carrying the API key.
    pub fn key_param(&self) -> &'static str {
        match self {
            Provider::Geoapify => "apiKey",
            Provider::OpenCage => "key",
        }
    }

    pub fn key_env_var(&self) -> &'static str {
        match self {
            Provider::Geoapify => "GEOAPIFY_API_KEY",
            Provider::OpenCage => "OPENCAGE_API_KEY",
        }
    }

    /// OpenCage's free tier allows one request per second.
    pub fn default_min_interval(&self) -> Duration {
        match self {
            Provider::Geoapify => Duration::ZERO,
            Provider::OpenCage => Duration::from_secs(1),
        }
    }

    /// Pulls the fields of the first candidate out of a decoded response.
    ///
    /// Returns `None` when the payload has no candidates at all; missing
    /// fields inside a candidate come back as `None` individually.
    pub fn extract(&self, body: &Value) -> Option<ExtractedFields> {
        let attrs = match self {
            Provider::Geoapify => body.get("features")?.get(0)?.get("properties")?,
            Provider::OpenCage => body.get("results")?.get(0)?.get("components")?,
        }
        .as_object()?;

        Some(ExtractedFields {
            state: text_field(attrs, "state_code"),
            country: text_field(attrs, "country_code"),
            postcode: text_field(attrs, "postcode"),
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn text_field(attrs: &Map<String, Value>, key: &str) -> Option<String> {
    match attrs.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_geoapify_first_feature() {
        let body = json!({
            "features": [
                {"properties": {"state_code": "ON", "country_code": "ca", "postcode": "K1A 0B1"}},
                {"properties": {"state_code": "QC", "country_code": "ca", "postcode": "H2X 1Y4"}}
            ]
        });

        let fields = Provider::Geoapify.extract(&body).unwrap();
        assert_eq!(fields.state.as_deref(), Some("ON"));
        assert_eq!(fields.country.as_deref(), Some("ca"));
        assert_eq!(fields.postcode.as_deref(), Some("K1A 0B1"));
    }

    #[test]
    fn test_extract_opencage_components() {
        let body = json!({
            "results": [
                {"components": {"state_code": "NY", "country_code": "us", "postcode": "10001"}}
            ]
        });

        let fields = Provider::OpenCage.extract(&body).unwrap();
        assert_eq!(fields.state.as_deref(), Some("NY"));
        assert_eq!(fields.country.as_deref(), Some("us"));
        assert_eq!(fields.postcode.as_deref(), Some("10001"));
    }

    #[test]
    fn test_extract_missing_fields_are_none() {
        let body = json!({"results": [{"components": {"country_code": "us"}}]});

        let fields = Provider::OpenCage.extract(&body).unwrap();
        assert_eq!(fields.country.as_deref(), Some("us"));
        assert!(fields.state.is_none());
        assert!(fields.postcode.is_none());
    }

    #[test]
    fn test_extract_numeric_postcode_is_text() {
        let body = json!({"features": [{"properties": {"postcode": 90210}}]});
        let fields = Provider::Geoapify.extract(&body).unwrap();
        assert_eq!(fields.postcode.as_deref(), Some("90210"));
    }

    #[test]
    fn test_extract_empty_result_set() {
        assert!(Provider::Geoapify.extract(&json!({"features": []})).is_none());
        assert!(Provider::OpenCage.extract(&json!({"results": []})).is_none());
    }

    #[test]
    fn test_extract_non_object_attributes_is_none() {
        let body = json!({"features": [{"properties": null}]});
        assert!(Provider::Geoapify.extract(&body).is_none());

        let body = json!({"results": [{"components": "ON"}]});
        assert!(Provider::OpenCage.extract(&body).is_none());
    }

    #[test]
    fn test_extract_uses_provider_specific_shape() {
        // A Geoapify payload means nothing to the OpenCage extractor.
        let body = json!({"features": [{"properties": {"state_code": "CA"}}]});
        assert!(Provider::OpenCage.extract(&body).is_none());
    }

    #[test]
    fn test_query_parameter_names() {
        assert_eq!(Provider::Geoapify.query_param(), "text");
        assert_eq!(Provider::Geoapify.key_param(), "apiKey");
        assert_eq!(Provider::OpenCage.query_param(), "q");
        assert_eq!(Provider::OpenCage.key_param(), "key");
    }
}
