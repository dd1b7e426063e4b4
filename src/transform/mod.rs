//! Pure, stateless row and column transforms.
//!
//! - [`case`]: PascalCase to snake_case column names
//! - [`geometry`]: GeoJSON Point construction from longitude/latitude
//!
//! Neither module performs I/O; the assets feed them plain data and persist
//! whatever they return.

pub mod case;
pub mod geometry;

pub use case::convert_name;
pub use geometry::{PointGeometry, add_geometry_column, build_point, point_from_row};
