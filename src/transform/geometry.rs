//! GeoJSON Point construction for rows carrying `longitude`/`latitude`.

use crate::error::{IngestError, Result};
use crate::table::{Row, Table};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Column read for the first coordinate.
pub const LONGITUDE: &str = "longitude";
/// Column read for the second coordinate.
pub const LATITUDE: &str = "latitude";

/// GeoJSON geometry type tag. Only points are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryType {
    Point,
}

/// `{"type": "Point", "coordinates": [longitude, latitude]}`
///
/// Coordinates follow GeoJSON order: longitude first. Values are not range
/// checked; a NaN coordinate serializes as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type")]
    pub kind: GeometryType,
    pub coordinates: [f64; 2],
}

impl PointGeometry {
    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// Build a point from a longitude/latitude pair.
pub fn build_point(longitude: f64, latitude: f64) -> PointGeometry {
    PointGeometry {
        kind: GeometryType::Point,
        coordinates: [longitude, latitude],
    }
}

/// Build a point from a row's `longitude` and `latitude` cells.
///
/// # Errors
///
/// - [`IngestError::MissingField`] if either column is absent
/// - [`IngestError::NonNumericField`] if a non-empty cell is not a number
///
/// An empty cell is a missing value and becomes NaN.
pub fn point_from_row(row: &Row<'_>) -> Result<PointGeometry> {
    let longitude = coordinate(row, LONGITUDE)?;
    let latitude = coordinate(row, LATITUDE)?;
    Ok(build_point(longitude, latitude))
}

fn coordinate(row: &Row<'_>, field: &str) -> Result<f64> {
    let cell = row.get(field).ok_or_else(|| IngestError::MissingField {
        field: field.to_string(),
    })?;

    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| IngestError::NonNumericField {
            field: field.to_string(),
            value: cell.to_string(),
        })
}

/// Append a column holding each row's point geometry as compact JSON.
///
/// Rows are processed positionally; the first failing row aborts the whole
/// column and leaves the table untouched.
pub fn add_geometry_column(table: &mut Table, name: &str) -> Result<()> {
    let geoms = table
        .rows()
        .map(|row| {
            let point = point_from_row(&row)?;
            Ok(serde_json::to_string(&point)?)
        })
        .collect::<Result<Vec<String>>>()?;

    debug!(column = name, rows = geoms.len(), "Built geometry column");
    table.push_column(name, geoms)
}
