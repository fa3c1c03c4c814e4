//! Zero-shot natural-language-inference backends.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_NLI_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/facebook/bart-large-mnli";

/// Labels ranked by the model, with the matching scores.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f32>,
}

#[async_trait::async_trait]
pub trait NliClassifier: Send + Sync {
    /// `hypothesis_template` contains a single `{}` slot for each candidate label.
    async fn classify(
        &self,
        premise: &str,
        candidate_labels: &[&str],
        hypothesis_template: &str,
    ) -> Result<Classification>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    One(Classification),
    Many(Vec<Classification>),
}

/// Hugging Face `zero-shot-classification` inference endpoint.
pub struct HfZeroShot {
    http: Client,
    endpoint: String,
    token: Option<String>,
}

impl HfZeroShot {
    pub fn new(endpoint: String, token: Option<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("building nli http client")?;
        Ok(Self { http, endpoint, token })
    }
}

#[async_trait::async_trait]
impl NliClassifier for HfZeroShot {
    async fn classify(
        &self,
        premise: &str,
        candidate_labels: &[&str],
        hypothesis_template: &str,
    ) -> Result<Classification> {
        let body = serde_json::json!({
            "inputs": premise,
            "parameters": {
                "candidate_labels": candidate_labels,
                "hypothesis_template": hypothesis_template,
            },
        });
        let mut req = self.http.post(&self.endpoint).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .context("nli request")?
            .error_for_status()?
            .json::<ZeroShotResponse>()
            .await
            .context("decoding nli response")?;
        match resp {
            ZeroShotResponse::One(c) => Ok(c),
            ZeroShotResponse::Many(v) => v.into_iter().next().context("nli response was an empty list"),
        }
    }
}
