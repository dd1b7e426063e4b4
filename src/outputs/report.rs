//! Materialization reports.
//!
//! Each successful asset run can be recorded as `<report_dir>/<asset>.json`.
//! A later run of the same asset replaces the previous report.

use crate::error::Result;
use crate::models::{MaterializeResult, MetadataValue};
use crate::outputs::json::write_json;
use std::path::Path;
use tracing::{info, instrument};

/// Write `result` to `<report_dir>/<asset>.json`.
#[instrument(level = "info", skip_all, fields(asset = %result.asset))]
pub async fn write_report(result: &MaterializeResult, report_dir: &Path) -> Result<()> {
    let path = report_dir.join(format!("{}.json", result.asset));
    write_json(result, &path).await
}

/// Log a result's metadata, one field per entry.
///
/// Markdown entries are logged at debug level since they span many lines.
pub fn log_result(result: &MaterializeResult) {
    for (key, value) in &result.metadata {
        match value {
            MetadataValue::Int(n) => info!(asset = %result.asset, key = %key, value = n, "Metadata"),
            MetadataValue::Path(p) => info!(asset = %result.asset, key = %key, value = %p, "Metadata"),
            MetadataValue::Md(md) => {
                tracing::debug!(asset = %result.asset, key = %key, "Metadata\n{md}")
            }
        }
    }
    info!(asset = %result.asset, at = %result.materialized_at, "Materialized");
}
