//! Shared HTTP session, fetch window, and the concurrent history fetch.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use tokio::task::JoinSet;

use crate::user_agent::get_user_agent;

/// Days of history requested per fetch, so the window always covers at
/// least one market-open session across weekends and holidays.
pub const LOOKBACK_DAYS: i64 = 10;

const PRODUCTION_BASE_URL: &str = "https://finance.yahoo.com";

/// Request timeout for history-page fetches.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from a single symbol's history fetch. Always scoped to that
/// symbol; a failing request never aborts its siblings in a batch.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {status}")]
    HttpStatus { status: StatusCode },
}

/// The two-endpoint time window embedded in a history URL.
#[derive(Debug, Clone, Copy)]
pub struct FetchWindow {
    pub prev: DateTime<Utc>,
    pub cur: DateTime<Utc>,
}

impl FetchWindow {
    /// Window ending at `cur` and starting [`LOOKBACK_DAYS`] earlier.
    pub fn ending_at(cur: DateTime<Utc>) -> Self {
        Self {
            prev: cur - chrono::Duration::days(LOOKBACK_DAYS),
            cur,
        }
    }
}

/// Builds the historical-prices URL for one symbol.
///
/// Pure string construction: identical inputs always produce an identical
/// URL, with the symbol uppercased and the window endpoints as
/// second-precision epoch integers.
pub fn history_url(base_url: &str, symbol: &str, window: &FetchWindow) -> String {
    format!(
        "{}/quote/{}/history?period1={}&period2={}&interval=1d",
        base_url,
        symbol.trim().to_uppercase(),
        window.prev.timestamp(),
        window.cur.timestamp()
    )
}

/// Shared HTTP session for history-page fetches.
///
/// One `reqwest::Client` (one connection pool) is built per program run
/// with a browser-like user agent and a fixed timeout, and reused across
/// every request and fetch cycle.
pub struct HistoryClient {
    base_url: String,
    http: reqwest::Client,
}

impl HistoryClient {
    /// Creates a client pointing at the production finance host.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_base_url(PRODUCTION_BASE_URL)
    }

    /// Creates a client with a custom base URL. Used for testing with
    /// wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Builds this client's history URL for one symbol.
    pub fn url_for(&self, symbol: &str, window: &FetchWindow) -> String {
        history_url(&self.base_url, symbol, window)
    }

    /// Fetches every symbol's page concurrently and waits for the whole
    /// batch to settle before returning.
    ///
    /// One task per symbol, bounded only by the batch size; a transport
    /// error or non-success status surfaces as that entry's `Err` while
    /// the rest of the batch completes normally. Result order is
    /// completion order.
    pub async fn fetch_batch(
        &self,
        requests: Vec<(String, String)>,
    ) -> Vec<(String, Result<String, FetchError>)> {
        let mut join_set = JoinSet::new();
        for (symbol, url) in requests {
            let http = self.http.clone();
            join_set.spawn(async move {
                let result = fetch_history(&http, &url).await;
                (symbol, result)
            });
        }

        let mut results = Vec::with_capacity(join_set.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(outcome) => results.push(outcome),
                Err(e) => tracing::error!("history fetch task failed to join: {}", e),
            }
        }
        results
    }
}

async fn fetch_history(http: &reqwest::Client, url: &str) -> Result<String, FetchError> {
    tracing::debug!("GET {}", url);
    let resp = http
        .get(url)
        .header("accept", "text/html,application/xhtml+xml")
        .header("accept-language", "en-US,en;q=0.9")
        .send()
        .await?;

    let status = resp.status();
    if !status.is_success() {
        tracing::warn!("history fetch returned status {} for {}", status, url);
        return Err(FetchError::HttpStatus { status });
    }

    Ok(resp.text().await?)
}
