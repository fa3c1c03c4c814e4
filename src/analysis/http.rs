use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{AnalyzedText, Analyzer};

/// Client for a spaCy-style annotation service.
///
/// `POST {endpoint}` with `{"text": ...}` must answer
/// `{"tokens": [{"text","pos","lemma","is_stop"}], "ents": [{"text","label"}]}`.
pub struct HttpAnalyzer {
    http: Client,
    endpoint: String,
}

impl HttpAnalyzer {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("building analyzer http client")?;
        Ok(Self { http, endpoint })
    }
}

#[async_trait::async_trait]
impl Analyzer for HttpAnalyzer {
    async fn analyze(&self, text: &str) -> Result<AnalyzedText> {
        let doc = self
            .http
            .post(&self.endpoint)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .with_context(|| format!("analysis request to {}", self.endpoint))?
            .error_for_status()?
            .json::<AnalyzedText>()
            .await
            .context("decoding analysis response")?;
        Ok(doc)
    }
}
