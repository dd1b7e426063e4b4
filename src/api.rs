//! HTTP fetching with exponential backoff retry logic.
//!
//! # Architecture
//!
//! The module uses a trait-based design so assets can be driven by a real
//! client or an in-memory fake:
//! - [`Fetch`]: Core trait, GET a URL and return the body as text
//! - [`HttpFetcher`]: `reqwest` implementation
//! - [`RetryFetch`]: Decorator that adds retry logic to any `Fetch` implementation
//!
//! # Retry Strategy
//!
//! - Only transient failures are retried (transport errors, 5xx, 429)
//! - Exponential backoff starting at the configured base delay
//! - Delay capped at the configured maximum
//! - Random jitter (0-250ms) added to prevent thundering herd

use crate::config::HttpConfig;
use crate::error::{IngestError, Result};
use crate::utils::truncate_for_log;
use rand::{Rng, rng};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Trait for async HTTP GET.
///
/// Implementors are only driven from the current task, so the returned
/// futures carry no `Send` bound.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    /// Fetch `url` and return the response body.
    ///
    /// A non-success status is an error ([`IngestError::Status`]).
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// [`Fetch`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client from the HTTP settings.
    ///
    /// # Arguments
    ///
    /// * `http` - Connect timeout and optional whole-request timeout
    ///
    /// # Returns
    ///
    /// The fetcher, or [`IngestError::Client`] if the client cannot be built.
    ///
    /// # Timeouts
    ///
    /// Only connection setup is bounded by default. A whole-request limit also
    /// covers the body download, which for the full NaPTAN export (tens of MB)
    /// can exceed any small fixed value on a slow link; set
    /// `http.timeout_secs` to opt into one.
    pub fn new(http: &HttpConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(http.connect_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = http.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(IngestError::Client)?;
        Ok(Self { client })
    }
}

impl Fetch for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let t0 = Instant::now();
        let http_err = |source| IngestError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, elapsed_ms = t0.elapsed().as_millis(), "Non-success status");
            return Err(IngestError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(http_err)?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Fetched"
        );
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`Fetch`] implementation.
///
/// The delay between retries follows this formula:
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    /// The underlying client to wrap.
    inner: T,
    /// Maximum number of retries after the first attempt.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    /// Maximum delay cap to prevent excessive waiting.
    max_delay: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: Fetch,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
        }
    }

    pub fn with_max_delay(mut self, max_delay: StdDuration) -> Self {
        self.max_delay = max_delay;
        self
    }

    fn backoff(&self, attempt: usize) -> StdDuration {
        let shift = (attempt.saturating_sub(1)).min(31) as u32;
        let delay = self
            .base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> Fetch for RetryFetch<T>
where
    T: Fetch,
{
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_transient() => {
                    error!(error = %e, "fetch failed; not retrying");
                    return Err(e);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis(),
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

/// Build the production fetcher: a `reqwest` client wrapped in [`RetryFetch`].
pub fn client_from_config(http: &HttpConfig) -> Result<RetryFetch<HttpFetcher>> {
    let client = HttpFetcher::new(http)?;
    Ok(RetryFetch::new(client, http.max_retries, http.base_delay()).with_max_delay(http.max_delay()))
}

/// Fetch `url` and deserialize the body as JSON.
#[instrument(level = "debug", skip(fetcher))]
pub async fn fetch_json<F, T>(fetcher: &F, url: &str) -> Result<T>
where
    F: Fetch,
    T: DeserializeOwned,
{
    let body = fetcher.fetch(url).await?;
    serde_json::from_str(&body).map_err(|e| {
        warn!(
            error = %e,
            body_preview = %truncate_for_log(&body, 300),
            "Response was not the expected JSON"
        );
        IngestError::Json(e)
    })
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory [`Fetch`] used by the unit tests across the crate.

    use super::*;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned bodies; unknown URLs answer 404. Counts every call.
    #[derive(Debug, Default)]
    pub(crate) struct FakeFetcher {
        routes: HashMap<String, std::result::Result<String, StatusCode>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeFetcher {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn with(mut self, url: &str, body: &str) -> Self {
            self.routes.insert(url.to_string(), Ok(body.to_string()));
            self
        }

        pub(crate) fn with_status(mut self, url: &str, status: StatusCode) -> Self {
            self.routes.insert(url.to_string(), Err(status));
            self
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Fetch for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.calls.lock().unwrap().push(url.to_string());
            match self.routes.get(url) {
                Some(Ok(body)) => Ok(body.clone()),
                Some(Err(status)) => Err(IngestError::Status {
                    url: url.to_string(),
                    status: *status,
                }),
                None => Err(IngestError::Status {
                    url: url.to_string(),
                    status: StatusCode::NOT_FOUND,
                }),
            }
        }
    }
}
