//! NaPTAN stops asset.
//!
//! Downloads the access-nodes CSV, stores it untouched (with an index
//! column), then stores a cleaned copy: snake_case column names plus a
//! `geom` column holding each stop's GeoJSON point.

use super::Asset;
use crate::api::Fetch;
use crate::config::NaptanConfig;
use crate::error::Result;
use crate::models::{MaterializeResult, MetadataValue};
use crate::outputs::tables::write_table;
use crate::table::Table;
use crate::transform::{add_geometry_column, convert_name};
use std::path::Path;
use tracing::{info, instrument};

/// Name of the appended geometry column.
pub const GEOMETRY_COLUMN: &str = "geom";

/// Rename every column to snake_case and append the geometry column.
pub fn clean_stops(mut table: Table) -> Result<Table> {
    table.rename_columns(convert_name);
    add_geometry_column(&mut table, GEOMETRY_COLUMN)?;
    Ok(table)
}

/// Fetch the stops dataset and write the raw and cleaned CSV files.
///
/// # Arguments
///
/// * `fetcher` - HTTP source for the CSV export
/// * `config` - Source URL and the raw and clean output paths
///
/// # Returns
///
/// A result with `num_records` and the clean file as `naptan_data_path`.
///
/// # Errors
///
/// The raw file is written before cleaning, so it survives a
/// [`MissingField`](crate::error::IngestError::MissingField) or
/// [`NonNumericField`](crate::error::IngestError::NonNumericField) from the
/// geometry step.
#[instrument(level = "info", skip_all, fields(source = %config.source_url))]
pub async fn stops_data<F: Fetch>(fetcher: &F, config: &NaptanConfig) -> Result<MaterializeResult> {
    let body = fetcher.fetch(&config.source_url).await?;
    let csv = body.strip_prefix('\u{feff}').unwrap_or(&body);

    let raw = Table::from_csv_reader(csv.as_bytes())?;
    info!(rows = raw.len(), columns = raw.columns().len(), "Parsed stops CSV");
    write_table(&raw, Path::new(&config.raw_data_path), true).await?;

    let clean = clean_stops(raw)?;
    write_table(&clean, Path::new(&config.clean_data_path), false).await?;

    Ok(MaterializeResult::new(Asset::NaptanStopsData.name())
        .with("num_records", MetadataValue::Int(clean.len() as u64))
        .with(
            "naptan_data_path",
            MetadataValue::Path(config.clean_data_path.clone()),
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeFetcher;
    use crate::error::IngestError;

    const SOURCE: &str = "https://naptan.test/access-nodes.csv";

    const STOPS_CSV: &str = "\u{feff}ATCOCode,NaptanCode,CommonName,Longitude,Latitude\n\
        490000077E,74433,Charing Cross,-0.12469,51.50748\n\
        0100BRP90312,bstmjdp,Temple Meads,-2.58525,51.44902\n";

    fn config_in(dir: &Path) -> NaptanConfig {
        NaptanConfig {
            source_url: SOURCE.to_string(),
            raw_data_path: dir.join("tmp/raw.csv").display().to_string(),
            clean_data_path: dir.join("tmp/clean.csv").display().to_string(),
        }
    }

    #[test]
    fn test_clean_stops() {
        let raw = Table::from_csv_reader(STOPS_CSV.trim_start_matches('\u{feff}').as_bytes())
            .unwrap();
        let clean = clean_stops(raw).unwrap();

        assert_eq!(
            clean.columns(),
            ["atco_code", "naptan_code", "common_name", "longitude", "latitude", "geom"]
        );
        let first = clean.rows().next().unwrap();
        assert_eq!(first.get("common_name"), Some("Charing Cross"));
        assert_eq!(
            first.get("geom"),
            Some(r#"{"type":"Point","coordinates":[-0.12469,51.50748]}"#)
        );
    }

    #[test]
    fn test_clean_stops_without_coordinates() {
        let raw = Table::from_csv_reader("AtcoCode,Easting\nX,1\n".as_bytes()).unwrap();
        assert!(matches!(
            clean_stops(raw),
            Err(IngestError::MissingField { field }) if field == "longitude"
        ));
    }

    #[tokio::test]
    async fn test_stops_data_writes_raw_and_clean() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let fake = FakeFetcher::new().with(SOURCE, STOPS_CSV);

        let result = stops_data(&fake, &config).await.unwrap();
        assert_eq!(result.asset, "naptan_stops_data");
        assert_eq!(result.num_records(), Some(2));
        assert_eq!(
            result.get("naptan_data_path"),
            Some(&MetadataValue::Path(config.clean_data_path.clone()))
        );

        let raw = std::fs::read_to_string(&config.raw_data_path).unwrap();
        assert!(raw.starts_with(",ATCOCode,NaptanCode,CommonName,Longitude,Latitude\n0,490000077E,"));

        let clean = std::fs::read_to_string(&config.clean_data_path).unwrap();
        let mut lines = clean.lines();
        assert_eq!(
            lines.next(),
            Some("atco_code,naptan_code,common_name,longitude,latitude,geom")
        );
        assert_eq!(
            lines.next(),
            Some(
                "490000077E,74433,Charing Cross,-0.12469,51.50748,\
                 \"{\"\"type\"\":\"\"Point\"\",\"\"coordinates\"\":[-0.12469,51.50748]}\""
            )
        );
    }

    #[tokio::test]
    async fn test_stops_data_fetch_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        assert!(stops_data(&FakeFetcher::new(), &config).await.is_err());
        assert!(!Path::new(&config.raw_data_path).exists());
    }

    #[tokio::test]
    async fn test_stops_data_keeps_raw_file_when_geometry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let fake = FakeFetcher::new().with(SOURCE, "ATCOCode,Longitude,Latitude\nX,-0.1,north\n");

        assert!(matches!(
            stops_data(&fake, &config).await,
            Err(IngestError::NonNumericField { field, .. }) if field == "latitude"
        ));
        let raw = std::fs::read_to_string(&config.raw_data_path).unwrap();
        assert_eq!(raw, ",ATCOCode,Longitude,Latitude\n0,X,-0.1,north\n");
        assert!(!Path::new(&config.clean_data_path).exists());
    }
}
