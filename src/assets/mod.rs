//! Materializable assets and the runner that executes them.
//!
//! # Assets
//!
//! | Asset | Module | Depends on | Output |
//! |-------|--------|------------|--------|
//! | `hackernews_top_story_ids` | [`hackernews`] | - | JSON array of ids |
//! | `hackernews_top_stories` | [`hackernews`] | `hackernews_top_story_ids` | CSV of story items |
//! | `naptan_stops_data` | [`naptan`] | - | raw and cleaned CSV |
//!
//! [`plan`] orders a selection so every asset runs after its dependencies;
//! [`run`] executes a plan, skipping assets whose dependencies failed while
//! independent assets carry on.

pub mod hackernews;
pub mod naptan;

use crate::api::Fetch;
use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::models::MaterializeResult;
use crate::outputs::report::{log_result, write_report};
use clap::ValueEnum;
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use tracing::{error, info, instrument, warn};

/// One materializable asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Asset {
    /// Top story ids from the Hacker News API
    #[value(name = "hackernews_top_story_ids")]
    HackernewsTopStoryIds,
    /// Story items for the stored top story ids
    #[value(name = "hackernews_top_stories")]
    HackernewsTopStories,
    /// NaPTAN stops with snake_case columns and a geometry column
    #[value(name = "naptan_stops_data")]
    NaptanStopsData,
}

impl Asset {
    /// Every asset, dependencies before dependents.
    pub const ALL: [Asset; 3] = [
        Asset::HackernewsTopStoryIds,
        Asset::HackernewsTopStories,
        Asset::NaptanStopsData,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Asset::HackernewsTopStoryIds => "hackernews_top_story_ids",
            Asset::HackernewsTopStories => "hackernews_top_stories",
            Asset::NaptanStopsData => "naptan_stops_data",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Asset::HackernewsTopStoryIds => {
                "Get top stories from the Hacker News top stories endpoint."
            }
            Asset::HackernewsTopStories => {
                "Get items based on story ids from the Hacker News items endpoint."
            }
            Asset::NaptanStopsData => {
                "Get stops from the NaPTAN access nodes endpoint and add a geom column."
            }
        }
    }

    /// Direct upstream assets.
    pub fn deps(self) -> &'static [Asset] {
        match self {
            Asset::HackernewsTopStories => &[Asset::HackernewsTopStoryIds],
            Asset::HackernewsTopStoryIds | Asset::NaptanStopsData => &[],
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Order `selected` for execution.
///
/// An empty selection means every asset. With `include_upstream`, the
/// transitive dependencies of the selection are added too. The result is in
/// dependency order without duplicates.
pub fn plan(selected: &[Asset], include_upstream: bool) -> Vec<Asset> {
    let mut wanted: HashSet<Asset> = if selected.is_empty() {
        Asset::ALL.into_iter().collect()
    } else {
        selected.iter().copied().collect()
    };

    if include_upstream {
        let mut pending = wanted.iter().copied().collect::<Vec<_>>();
        while let Some(asset) = pending.pop() {
            for dep in asset.deps() {
                if wanted.insert(*dep) {
                    pending.push(*dep);
                }
            }
        }
    }

    Asset::ALL
        .into_iter()
        .filter(|a| wanted.contains(a))
        .collect()
}

/// Materialize a single asset.
pub async fn materialize<F: Fetch>(
    asset: Asset,
    fetcher: &F,
    config: &IngestConfig,
) -> Result<MaterializeResult> {
    match asset {
        Asset::HackernewsTopStoryIds => {
            hackernews::top_story_ids(fetcher, &config.hackernews).await
        }
        Asset::HackernewsTopStories => {
            hackernews::top_stories(fetcher, &config.hackernews, config.http.concurrency).await
        }
        Asset::NaptanStopsData => naptan::stops_data(fetcher, &config.naptan).await,
    }
}

/// What happened to each asset in a run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub materialized: Vec<MaterializeResult>,
    pub failed: Vec<(Asset, IngestError)>,
    /// Assets not attempted because an upstream asset failed.
    pub skipped: Vec<Asset>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }

    fn blocked(&self, asset: Asset) -> bool {
        asset.deps().iter().any(|dep| {
            self.skipped.contains(dep) || self.failed.iter().any(|(failed, _)| failed == dep)
        })
    }
}

/// Execute `plan` in order.
///
/// Results are logged and, when `report_dir` is configured, written as
/// reports. A report that cannot be written is logged and does not fail
/// the asset.
///
/// # Returns
///
/// The [`RunSummary`]; failures are collected there rather than returned.
#[instrument(level = "info", skip_all, fields(assets = plan.len()))]
pub async fn run<F: Fetch>(plan: &[Asset], fetcher: &F, config: &IngestConfig) -> RunSummary {
    let mut summary = RunSummary::default();

    for &asset in plan {
        if summary.blocked(asset) {
            warn!(%asset, "Upstream asset failed; skipping");
            summary.skipped.push(asset);
            continue;
        }

        info!(%asset, "Materializing");
        match materialize(asset, fetcher, config).await {
            Ok(result) => {
                log_result(&result);
                if let Some(dir) = &config.report_dir {
                    if let Err(e) = write_report(&result, Path::new(dir)).await {
                        warn!(%asset, error = %e, "Failed to write materialization report");
                    }
                }
                summary.materialized.push(result);
            }
            Err(e) => {
                error!(%asset, error = %e, "Materialization failed");
                summary.failed.push((asset, e));
            }
        }
    }

    info!(
        materialized = summary.materialized.len(),
        failed = summary.failed.len(),
        skipped = summary.skipped.len(),
        "Run complete"
    );
    summary
}
