use anyhow::Result;
use async_openai::types::ChatCompletionRequestMessage;

pub mod openai;

#[async_trait::async_trait]
pub trait Llm: Send + Sync {
    /// Sends one conversation and returns the content of the first choice.
    async fn chat(&self, messages: Vec<ChatCompletionRequestMessage>) -> Result<String>;
}
