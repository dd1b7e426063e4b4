//! Hacker News assets.
//!
//! Two phases:
//!
//! 1. [`top_story_ids`]: fetch `topstories.json`, keep the first
//!    `top_stories_limit` ids and store them as a JSON array
//! 2. [`top_stories`]: read that array back, fetch `item/{id}.json` for each
//!    id, and store the items as CSV
//!
//! The second phase depends on the file written by the first.

use super::Asset;
use crate::api::{Fetch, fetch_json};
use crate::config::HackerNewsConfig;
use crate::error::Result;
use crate::models::{MaterializeResult, MetadataValue};
use crate::outputs::json::{read_json, write_json};
use crate::outputs::tables::write_table;
use crate::table::Table;
use futures::stream::{self, StreamExt};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Columns shown in the top stories preview.
pub const PREVIEW_COLUMNS: [&str; 3] = ["title", "by", "url"];

/// Parse the configured API base, making sure relative joins append to it.
pub fn api_base(config: &HackerNewsConfig) -> Result<Url> {
    let mut base = config.api_base_url.clone();
    if !base.ends_with('/') {
        base.push('/');
    }
    Ok(Url::parse(&base)?)
}

pub fn top_stories_url(base: &Url) -> Result<Url> {
    Ok(base.join("topstories.json")?)
}

pub fn item_url(base: &Url, id: u64) -> Result<Url> {
    Ok(base.join(&format!("item/{id}.json"))?)
}

/// Fetch the current top story ids and store the first `top_stories_limit`.
///
/// # Arguments
///
/// * `fetcher` - HTTP source for the top stories endpoint
/// * `config` - API base, limit and output path
///
/// # Returns
///
/// A result with `num_records` and the ids file `path`.
#[instrument(level = "info", skip_all, fields(limit = config.top_stories_limit))]
pub async fn top_story_ids<F: Fetch>(
    fetcher: &F,
    config: &HackerNewsConfig,
) -> Result<MaterializeResult> {
    let base = api_base(config)?;
    let mut ids: Vec<u64> = fetch_json(fetcher, top_stories_url(&base)?.as_str()).await?;

    let available = ids.len();
    ids.truncate(config.top_stories_limit);
    info!(available, kept = ids.len(), "Fetched top story ids");

    write_json(&ids, Path::new(&config.top_story_ids_path)).await?;

    Ok(MaterializeResult::new(Asset::HackernewsTopStoryIds.name())
        .with("num_records", MetadataValue::Int(ids.len() as u64))
        .with(
            "path",
            MetadataValue::Path(config.top_story_ids_path.clone()),
        ))
}

/// Fetch every stored top story id and write the items as CSV.
///
/// Up to `concurrency` requests are in flight at once; rows keep the order
/// of the stored ids. Ids whose item is `null` (deleted) are skipped.
///
/// # Arguments
///
/// * `fetcher` - HTTP source for item lookups
/// * `config` - API base plus the ids input and CSV output paths
/// * `concurrency` - Maximum requests in flight; 0 is treated as 1
///
/// # Returns
///
/// A result with `num_records` and a Markdown `preview` of title, author
/// and URL.
///
/// # Errors
///
/// Fails without writing the CSV if the ids file is missing or any item
/// request fails.
#[instrument(level = "info", skip_all, fields(concurrency = concurrency))]
pub async fn top_stories<F: Fetch>(
    fetcher: &F,
    config: &HackerNewsConfig,
    concurrency: usize,
) -> Result<MaterializeResult> {
    let ids: Vec<u64> = read_json(Path::new(&config.top_story_ids_path)).await?;
    let base = api_base(config)?;
    let urls = ids
        .iter()
        .map(|id| item_url(&base, *id))
        .collect::<Result<Vec<_>>>()?;
    debug!(count = urls.len(), "Fetching top story items");

    let responses: Vec<Result<Option<Map<String, Value>>>> = stream::iter(urls)
        .map(move |url| async move { fetch_json(fetcher, url.as_str()).await })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut items = Vec::with_capacity(responses.len());
    for (id, response) in ids.iter().zip(responses) {
        match response? {
            Some(item) => items.push(item),
            None => warn!(id, "Item is null; skipping"),
        }
    }

    let table = Table::from_json_objects(&items);
    write_table(&table, Path::new(&config.top_stories_path), true).await?;
    info!(rows = table.len(), columns = table.columns().len(), "Stored top stories");

    Ok(MaterializeResult::new(Asset::HackernewsTopStories.name())
        .with("num_records", MetadataValue::Int(table.len() as u64))
        .with(
            "preview",
            MetadataValue::Md(table.to_markdown(&PREVIEW_COLUMNS)),
        )
        .with("path", MetadataValue::Path(config.top_stories_path.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::FakeFetcher;
    use crate::error::IngestError;

    const BASE: &str = "https://hn.test/v0/";

    fn config_in(dir: &Path, limit: usize) -> HackerNewsConfig {
        HackerNewsConfig {
            api_base_url: BASE.to_string(),
            top_stories_limit: limit,
            top_story_ids_path: dir.join("ids.json").display().to_string(),
            top_stories_path: dir.join("stories/top.csv").display().to_string(),
        }
    }

    #[test]
    fn test_urls() {
        let config = HackerNewsConfig {
            api_base_url: "https://hacker-news.firebaseio.com/v0".to_string(),
            ..HackerNewsConfig::default()
        };
        let base = api_base(&config).unwrap();
        assert_eq!(
            top_stories_url(&base).unwrap().as_str(),
            "https://hacker-news.firebaseio.com/v0/topstories.json"
        );
        assert_eq!(
            item_url(&base, 8863).unwrap().as_str(),
            "https://hacker-news.firebaseio.com/v0/item/8863.json"
        );
    }

    #[tokio::test]
    async fn test_top_story_ids_truncates_to_limit() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), 3);
        let fake = FakeFetcher::new().with(
            "https://hn.test/v0/topstories.json",
            "[50, 40, 30, 20, 10]",
        );

        let result = top_story_ids(&fake, &config).await.unwrap();

        assert_eq!(result.asset, "hackernews_top_story_ids");
        assert_eq!(result.num_records(), Some(3));
        let stored = std::fs::read_to_string(&config.top_story_ids_path).unwrap();
        assert_eq!(stored, "[50,40,30]");
    }

    /// Delays each item response by a per-id amount before answering from
    /// the inner fake, so responses complete out of request order.
    struct StaggeredFetcher {
        inner: FakeFetcher,
        delays_ms: Vec<(u64, u64)>,
    }

    impl Fetch for StaggeredFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            let delay = self
                .delays_ms
                .iter()
                .find(|(id, _)| url.ends_with(&format!("/item/{id}.json")))
                .map_or(0, |(_, ms)| *ms);
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
            self.inner.fetch(url).await
        }
    }

    #[tokio::test]
    async fn test_top_stories_preserves_order_and_skips_null() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), 10);
        std::fs::write(&config.top_story_ids_path, "[3, 1, 4, 2]").unwrap();

        // the first id answers last; completion order is 1, 2, 4, 3
        let fetcher = StaggeredFetcher {
            inner: FakeFetcher::new()
                .with(
                    "https://hn.test/v0/item/3.json",
                    r#"{"by":"c","id":3,"title":"Third","type":"story","url":"https://c.test"}"#,
                )
                .with("https://hn.test/v0/item/1.json", "null")
                .with(
                    "https://hn.test/v0/item/4.json",
                    r#"{"by":"d","id":4,"title":"Fourth","type":"story"}"#,
                )
                .with(
                    "https://hn.test/v0/item/2.json",
                    r#"{"by":"b","id":2,"kids":[7,8],"title":"Second","type":"story"}"#,
                ),
            delays_ms: vec![(3, 150), (1, 0), (4, 100), (2, 50)],
        };

        let result = top_stories(&fetcher, &config, 4).await.unwrap();
        assert_eq!(result.num_records(), Some(3));
        match result.get("preview") {
            Some(MetadataValue::Md(md)) => {
                let rows = md.lines().skip(2).collect::<Vec<_>>();
                assert_eq!(
                    rows,
                    [
                        "| 0 | Third | c | https://c.test |",
                        "| 1 | Fourth | d |  |",
                        "| 2 | Second | b |  |",
                    ]
                );
            }
            other => panic!("unexpected preview {other:?}"),
        }

        let csv = std::fs::read_to_string(&config.top_stories_path).unwrap();
        let lines = csv.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            [
                ",by,id,title,type,url,kids",
                "0,c,3,Third,story,https://c.test,",
                "1,d,4,Fourth,story,,",
                "2,b,2,Second,story,,\"[7,8]\"",
            ]
        );
    }

    #[tokio::test]
    async fn test_top_stories_needs_ids_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), 10);
        let res = top_stories(&FakeFetcher::new(), &config, 4).await;
        assert!(matches!(res, Err(IngestError::Io { .. })));
    }

    #[tokio::test]
    async fn test_top_stories_propagates_item_failure() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), 10);
        std::fs::write(&config.top_story_ids_path, "[1]").unwrap();

        let res = top_stories(&FakeFetcher::new(), &config, 4).await;
        assert!(matches!(res, Err(IngestError::Status { .. })));
        assert!(!Path::new(&config.top_stories_path).exists());
    }
}
