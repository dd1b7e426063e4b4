//! Command-line interface definitions.
//!
//! Global options can also come from environment variables; anything set
//! here overrides the YAML config file.

use clap::{Parser, Subcommand};
use quickstart_ingest::assets::Asset;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Materialize everything with defaults
/// quickstart_ingest materialize
///
/// # Only the stops, with a config file
/// quickstart_ingest -c ingest.yaml materialize naptan_stops_data
///
/// # Top stories, fetching their ids first
/// quickstart_ingest --top-stories-limit 25 materialize hackernews_top_stories --with-upstream
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, env = "INGEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// Number of top story ids to keep (overrides the config file)
    #[arg(long, env = "TOP_STORIES_LIMIT")]
    pub top_stories_limit: Option<usize>,

    /// Directory for materialization reports (overrides the config file)
    #[arg(long, env = "INGEST_REPORT_DIR")]
    pub report_dir: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List assets and their dependencies
    List,
    /// Materialize assets (all of them when none are named)
    Materialize {
        /// Assets to materialize
        #[arg(value_enum)]
        assets: Vec<Asset>,

        /// Also materialize the upstream dependencies of the named assets
        #[arg(long)]
        with_upstream: bool,
    },
}
