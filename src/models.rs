//! Data models for materialization results.
//!
//! Every asset run produces one [`MaterializeResult`]: which asset ran, when,
//! and a small ordered set of metadata entries (record counts, output paths,
//! a Markdown preview). Results are logged and optionally written as JSON
//! reports by [`crate::outputs::report`].

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// A single metadata value attached to a materialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    /// A count, such as the number of records written.
    Int(u64),
    /// A filesystem path of a written output.
    Path(String),
    /// Markdown text, such as a table preview.
    Md(String),
}

/// Outcome of materializing one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterializeResult {
    /// Asset name, e.g. `naptan_stops_data`.
    pub asset: String,
    /// UTC time the asset finished, RFC 3339.
    pub materialized_at: String,
    /// Metadata entries in insertion order.
    pub metadata: Vec<(String, MetadataValue)>,
}

impl MaterializeResult {
    /// Start a result for `asset`, stamped with the current time.
    pub fn new(asset: impl Into<String>) -> Self {
        Self {
            asset: asset.into(),
            materialized_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            metadata: Vec::new(),
        }
    }

    /// Append a metadata entry.
    pub fn with(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.push((key.into(), value));
        self
    }

    /// Look up a metadata entry by key.
    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// The `num_records` entry, if present.
    pub fn num_records(&self) -> Option<u64> {
        match self.get("num_records") {
            Some(MetadataValue::Int(n)) => Some(*n),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_materialize_result_builder() {
        let result = MaterializeResult::new("naptan_stops_data")
            .with("num_records", MetadataValue::Int(42))
            .with("naptan_data_path", MetadataValue::Path("tmp/clean.csv".to_string()));

        assert_eq!(result.asset, "naptan_stops_data");
        assert_eq!(result.num_records(), Some(42));
        assert_eq!(
            result.get("naptan_data_path"),
            Some(&MetadataValue::Path("tmp/clean.csv".to_string()))
        );
        assert!(result.materialized_at.ends_with('Z'));
    }

    #[test]
    fn test_metadata_serialization() {
        let json = serde_json::to_value(MetadataValue::Md("| a |".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "md", "value": "| a |"}));
    }

    #[test]
    fn test_materialize_result_deserialization() {
        let json = r#"{
            "asset": "hackernews_top_stories",
            "materialized_at": "2025-05-06T08:00:00Z",
            "metadata": [["num_records", {"kind": "int", "value": 10}]]
        }"#;

        let result: MaterializeResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.asset, "hackernews_top_stories");
        assert_eq!(result.num_records(), Some(10));
    }
}
