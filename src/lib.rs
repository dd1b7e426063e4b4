//! # quickstart_ingest
//!
//! Two small ingestion pipelines run as named assets:
//!
//! - **Hacker News**: fetch the top story ids, keep the first few, then
//!   fetch each story and store them as CSV
//! - **NaPTAN**: fetch the UK transit stop dataset, store it raw, then store
//!   a cleaned copy with snake_case columns and a GeoJSON `geom` column
//!
//! The non-I/O core is two pure functions, re-exported from [`transform`]:
//!
//! ```
//! use quickstart_ingest::transform::{build_point, convert_name};
//!
//! assert_eq!(convert_name("NaptanCode"), "naptan_code");
//! assert_eq!(build_point(-0.13, 51.5).coordinates, [-0.13, 51.5]);
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching** ([`api`]): HTTP GET with retry and backoff
//! 2. **Transforming** ([`table`], [`transform`]): column renames and geometry
//! 3. **Output** ([`outputs`]): JSON/CSV files and materialization reports
//! 4. **Orchestration** ([`assets`]): dependency-ordered asset runs

pub mod api;
pub mod assets;
pub mod config;
pub mod error;
pub mod models;
pub mod outputs;
pub mod table;
pub mod transform;
pub mod utils;

pub use error::{IngestError, Result};
