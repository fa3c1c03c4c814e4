use anyhow::{Context, Result};
use async_openai::{
    config::OpenAIConfig,
    types::{ChatCompletionRequestMessage, CreateChatCompletionRequestArgs},
    Client,
};
use std::time::Duration;
use tracing::debug;

use super::Llm;

/// Chat-completion client for any OpenAI-compatible endpoint (OpenRouter by default).
#[derive(Clone)]
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    model: String,
    max_tokens: u32,
    /// Overall deadline for one `chat` call, including async-openai's 429 backoff.
    deadline: Duration,
}

impl LlmClient {
    pub fn new(
        model: String,
        base_url: Option<String>,
        api_key: Option<String>,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self> {
        let mut cfg = OpenAIConfig::default();
        if let Some(url) = base_url { cfg = cfg.with_api_base(url); }
        if let Some(key) = api_key { cfg = cfg.with_api_key(key); }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building chat completion http client")?;
        let client = Client::with_config(cfg).with_http_client(http);
        Ok(Self { client, model, max_tokens, deadline: timeout })
    }
}

#[async_trait::async_trait]
impl Llm for LlmClient {
    async fn chat(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        let req = CreateChatCompletionRequestArgs::default()
            .model(self.model.clone())
            .messages(messages)
            .max_tokens(self.max_tokens)
            .build()?;
        let resp = tokio::time::timeout(self.deadline, self.client.chat().create(req))
            .await
            .map_err(|_| anyhow::anyhow!("no answer within {:?}", self.deadline))
            .and_then(|res| res.map_err(anyhow::Error::from))
            .with_context(|| format!("chat completion request to model {}", self.model))?;
        let choice = resp.choices.into_iter().next().context("chat completion returned no choices")?;
        let text = choice.message.content.unwrap_or_default();
        debug!(model = %self.model, chars = text.len(), "chat completion received");
        Ok(text)
    }
}
