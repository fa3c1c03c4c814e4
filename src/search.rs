use anyhow::{Context, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use nonzero_ext::nonzero;
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub link: String,
}

#[derive(Debug, Deserialize)]
struct PseResponse {
    #[serde(default)]
    items: Vec<SearchHit>,
}

#[async_trait::async_trait]
pub trait Searcher: Send + Sync {
    /// One backend request; hits come back in backend ranking order.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Google Programmable Search Engine client.
pub struct GooglePse {
    http: Client,
    endpoint: String,
    key: String,
    cx: String,
    limiter: DefaultDirectRateLimiter,
}

impl GooglePse {
    pub fn new(endpoint: String, key: String, cx: String, qps: u32, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("building search http client")?;
        let qps = NonZeroU32::new(qps).unwrap_or(nonzero!(1u32));
        let limiter = RateLimiter::direct(Quota::per_second(qps));
        Ok(Self { http, endpoint, key, cx, limiter })
    }
}

#[async_trait::async_trait]
impl Searcher for GooglePse {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.limiter.until_ready().await;
        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[("key", self.key.as_str()), ("cx", self.cx.as_str()), ("q", query)])
            .send()
            .await
            .context("search request")?
            .error_for_status()?
            .json::<PseResponse>()
            .await
            .context("decoding search response")?;
        debug!(items = resp.items.len(), "search backend answered");
        Ok(resp.items.into_iter().take(max_results).collect())
    }
}
