//! Runtime configuration.
//!
//! Defaults reproduce the stock setup: ten top stories, output files in the
//! working directory for Hacker News and under `tmp/` for NaPTAN. Any field
//! can be overridden from a YAML file; missing sections and keys keep their
//! defaults.
//!
//! ```yaml
//! hackernews:
//!   top_stories_limit: 25
//! naptan:
//!   clean_data_path: out/stops.csv
//! http:
//!   max_retries: 3
//! report_dir: out/reports
//! ```

use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{info, instrument};

/// Top-level configuration passed to every asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub hackernews: HackerNewsConfig,
    pub naptan: NaptanConfig,
    pub http: HttpConfig,
    /// Directory for materialization reports; none are written when unset.
    pub report_dir: Option<String>,
}

/// Settings for the two Hacker News assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HackerNewsConfig {
    /// Base of the v0 API. Endpoints are joined onto it.
    pub api_base_url: String,
    /// How many of the top story ids to keep.
    pub top_stories_limit: usize,
    pub top_story_ids_path: String,
    pub top_stories_path: String,
}

impl Default for HackerNewsConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://hacker-news.firebaseio.com/v0/".to_string(),
            top_stories_limit: 10,
            top_story_ids_path: "hackernews_top_story_ids.json".to_string(),
            top_stories_path: "hackernews_top_stories.csv".to_string(),
        }
    }
}

/// Settings for the NaPTAN stops asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaptanConfig {
    /// CSV export of the access-nodes endpoint. The download is large and
    /// only connection setup is time-limited unless `http.timeout_secs` is set.
    pub source_url: String,
    pub raw_data_path: String,
    pub clean_data_path: String,
}

impl Default for NaptanConfig {
    fn default() -> Self {
        Self {
            source_url: "https://naptan.api.dft.gov.uk/v1/access-nodes?dataFormat=csv".to_string(),
            raw_data_path: "tmp/naptan_raw_data.csv".to_string(),
            clean_data_path: "tmp/naptan_clean_data.csv".to_string(),
        }
    }
}

/// HTTP client and retry settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Retries after the first attempt for transient failures.
    pub max_retries: usize,
    /// First backoff delay; doubles each retry.
    pub base_delay_ms: u64,
    /// Cap on a single backoff delay.
    pub max_delay_ms: u64,
    /// Limit on establishing a connection.
    pub connect_timeout_secs: u64,
    /// Limit on a whole request including the body download. Unset by
    /// default: the NaPTAN export is tens of MB and a fixed cap would abort
    /// (and retry from scratch) slow but healthy downloads.
    pub timeout_secs: Option<u64>,
    /// Concurrent item requests for the top stories asset.
    pub concurrency: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
            connect_timeout_secs: 10,
            timeout_secs: None,
            concurrency: 8,
        }
    }
}

impl HttpConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Load configuration from a YAML file, or the defaults when `path` is `None`.
#[instrument(level = "info")]
pub fn load_config(path: Option<&Path>) -> Result<IngestConfig> {
    let Some(path) = path else {
        info!("No config file given; using defaults");
        return Ok(IngestConfig::default());
    };

    let text = std::fs::read_to_string(path).map_err(|e| IngestError::io(path, e))?;
    let config = parse_config(&text).map_err(|source| IngestError::Config {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "Loaded configuration");
    Ok(config)
}

fn parse_config(text: &str) -> std::result::Result<IngestConfig, serde_yaml::Error> {
    // an empty document parses as null, which should mean "all defaults"
    if text.trim().is_empty() {
        return Ok(IngestConfig::default());
    }
    serde_yaml::from_str(text)
}
