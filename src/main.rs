//! # quickstart_ingest
//!
//! Command-line runner for the ingestion assets.
//!
//! ## Usage
//!
//! ```sh
//! quickstart_ingest list
//! quickstart_ingest materialize
//! quickstart_ingest materialize naptan_stops_data
//! ```
//!
//! Logging honors `RUST_LOG` (default `info`).

use clap::Parser;
use quickstart_ingest::api::client_from_config;
use quickstart_ingest::assets::{self, Asset};
use quickstart_ingest::config::load_config;
use quickstart_ingest::utils::ensure_writable_dir;
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = load_config(args.config.as_deref())?;
    if let Some(limit) = args.top_stories_limit {
        config.hackernews.top_stories_limit = limit;
    }
    if let Some(dir) = args.report_dir {
        config.report_dir = Some(dir);
    }

    let (selected, with_upstream) = match args.command {
        Command::List => {
            for asset in Asset::ALL {
                let deps = asset
                    .deps()
                    .iter()
                    .map(|d| d.name())
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("{asset}\n    {}\n    deps: [{deps}]", asset.description());
            }
            return Ok(());
        }
        Command::Materialize {
            assets,
            with_upstream,
        } => (assets, with_upstream),
    };

    // Early check: fail before any fetching if reports cannot be written
    if let Some(dir) = &config.report_dir {
        if let Err(e) = ensure_writable_dir(Path::new(dir)).await {
            error!(path = %dir, error = %e, "Report directory is not writable");
            return Err(e.into());
        }
    }

    let plan = assets::plan(&selected, with_upstream);
    info!(plan = ?plan.iter().map(|a| a.name()).collect::<Vec<_>>(), "Planned run");

    let fetcher = client_from_config(&config.http)?;
    let summary = assets::run(&plan, &fetcher, &config).await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        materialized = summary.materialized.len(),
        "Execution complete"
    );

    if summary.is_success() {
        Ok(())
    } else {
        let failed = summary
            .failed
            .iter()
            .map(|(asset, e)| format!("{asset}: {e}"))
            .chain(summary.skipped.iter().map(|asset| format!("{asset}: skipped")))
            .collect::<Vec<_>>();
        Err(format!("run did not complete: {}", failed.join("; ")).into())
    }
}
