//! Output persistence for materialized assets.
//!
//! # Submodules
//!
//! - [`json`]: Writes and reads JSON documents (the top story id list)
//! - [`tables`]: Writes [`Table`](crate::table::Table)s as CSV files
//! - [`report`]: Writes materialization reports
//!
//! # Output Structure
//!
//! ```text
//! ./
//! ├── hackernews_top_story_ids.json
//! ├── hackernews_top_stories.csv
//! └── tmp/
//!     ├── naptan_raw_data.csv
//!     └── naptan_clean_data.csv
//!
//! report_dir/               # only when configured
//! ├── hackernews_top_story_ids.json
//! ├── hackernews_top_stories.json
//! └── naptan_stops_data.json
//! ```
//!
//! Parent directories are created on demand.

pub mod json;
pub mod report;
pub mod tables;
