//! Command-line / environment configuration and backend wiring.

use clap::{Args, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::analysis::{Analyzer, HeuristicAnalyzer, HttpAnalyzer};
use crate::error::VerifyError;
use crate::llm::openai::LlmClient;
use crate::nli::{HfZeroShot, NliClassifier, DEFAULT_NLI_ENDPOINT};
use crate::pipeline::{Pipeline, DEFAULT_MAX_RESULTS};
use crate::query::{GenerativeQueryBuilder, LinguisticQueryBuilder, QueryBuilder};
use crate::search::{GooglePse, Searcher, DEFAULT_SEARCH_ENDPOINT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum QueryStrategy {
    /// Entities, proper nouns, verbs and nouns from the claim
    Linguistic,
    /// Ask a chat model for a search query
    Generative,
}

#[derive(Debug, Clone, Args)]
pub struct PipelineArgs {
    #[arg(long, value_enum, env = "CLAIMCHECK_QUERY_STRATEGY", default_value_t = QueryStrategy::Generative)]
    pub query_strategy: QueryStrategy,
    /// Evidence items to retrieve and score per claim
    #[arg(long, env = "CLAIMCHECK_MAX_RESULTS", default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    #[arg(long, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,
    /// Programmable Search Engine id (`cx`)
    #[arg(long, env = "GOOGLE_PSE_ID")]
    pub google_pse_id: Option<String>,
    #[arg(long, default_value = DEFAULT_SEARCH_ENDPOINT)]
    pub search_endpoint: String,
    #[arg(long, default_value_t = 5)]
    pub search_qps: u32,
    #[arg(long, default_value_t = 10)]
    pub search_timeout_secs: u64,

    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub openrouter_api_key: Option<String>,
    #[arg(long, env = "CLAIMCHECK_LLM_BASE_URL", default_value = "https://openrouter.ai/api/v1")]
    pub llm_base_url: String,
    #[arg(long, env = "CLAIMCHECK_LLM_MODEL", default_value = "google/gemini-flash-1.5")]
    pub llm_model: String,
    #[arg(long, default_value_t = 32)]
    pub llm_max_tokens: u32,
    #[arg(long, default_value_t = 30)]
    pub llm_timeout_secs: u64,

    #[arg(long, env = "HF_API_TOKEN", hide_env_values = true)]
    pub hf_api_token: Option<String>,
    #[arg(long, env = "CLAIMCHECK_NLI_ENDPOINT", default_value = DEFAULT_NLI_ENDPOINT)]
    pub nli_endpoint: String,
    #[arg(long, default_value_t = 60)]
    pub nli_timeout_secs: u64,

    /// Annotation service for the linguistic strategy; the built-in heuristic is used when unset
    #[arg(long, env = "CLAIMCHECK_ANALYZER_URL")]
    pub analyzer_url: Option<String>,
    #[arg(long, default_value_t = 10)]
    pub analyzer_timeout_secs: u64,
}

/// Rejects unset, blank and placeholder (`sk-...`) credentials.
fn require_key(name: &str, value: Option<&str>) -> Result<String, VerifyError> {
    match value.map(str::trim) {
        Some(key) if !key.is_empty() && !key.contains("...") => Ok(key.to_string()),
        _ => Err(VerifyError::config(format!("{name} is missing or a placeholder"))),
    }
}

impl PipelineArgs {
    pub fn checked_max_results(&self) -> Result<usize, VerifyError> {
        if self.max_results == 0 {
            return Err(VerifyError::config("max_results must be at least 1"));
        }
        Ok(self.max_results)
    }

    /// Only the generative strategy needs `OPENROUTER_API_KEY`.
    pub fn build_query_builder(&self) -> Result<Arc<dyn QueryBuilder>, VerifyError> {
        match self.query_strategy {
            QueryStrategy::Generative => {
                let key = require_key("OPENROUTER_API_KEY", self.openrouter_api_key.as_deref())?;
                let llm = LlmClient::new(
                    self.llm_model.clone(),
                    Some(self.llm_base_url.clone()),
                    Some(key),
                    self.llm_max_tokens,
                    Duration::from_secs(self.llm_timeout_secs),
                )
                .map_err(|e| VerifyError::config(format!("{e:#}")))?;
                Ok(Arc::new(GenerativeQueryBuilder::new(Arc::new(llm))))
            }
            QueryStrategy::Linguistic => {
                let analyzer: Arc<dyn Analyzer> = match &self.analyzer_url {
                    Some(url) => Arc::new(
                        HttpAnalyzer::new(url.clone(), Duration::from_secs(self.analyzer_timeout_secs))
                            .map_err(|e| VerifyError::config(format!("{e:#}")))?,
                    ),
                    None => Arc::new(HeuristicAnalyzer),
                };
                Ok(Arc::new(LinguisticQueryBuilder::new(analyzer)))
            }
        }
    }

    pub fn build_searcher(&self) -> Result<Arc<dyn Searcher>, VerifyError> {
        let searcher = GooglePse::new(
            self.search_endpoint.clone(),
            require_key("GOOGLE_API_KEY", self.google_api_key.as_deref())?,
            require_key("GOOGLE_PSE_ID", self.google_pse_id.as_deref())?,
            self.search_qps,
            Duration::from_secs(self.search_timeout_secs),
        )
        .map_err(|e| VerifyError::config(format!("{e:#}")))?;
        Ok(Arc::new(searcher))
    }

    pub fn build_classifier(&self) -> Result<Arc<dyn NliClassifier>, VerifyError> {
        let classifier = HfZeroShot::new(
            self.nli_endpoint.clone(),
            self.hf_api_token.clone().filter(|t| !t.trim().is_empty()),
            Duration::from_secs(self.nli_timeout_secs),
        )
        .map_err(|e| VerifyError::config(format!("{e:#}")))?;
        Ok(Arc::new(classifier))
    }

    /// Builds every backend once; the result is shared by all requests.
    pub fn build_pipeline(&self) -> Result<Pipeline, VerifyError> {
        let max_results = self.checked_max_results()?;
        let pipeline = Pipeline::new(self.build_query_builder()?, self.build_searcher()?, self.build_classifier()?)
            .with_max_results(max_results);

        info!(
            strategy = ?self.query_strategy,
            max_results,
            nli = %self.nli_endpoint,
            "pipeline backends initialised"
        );
        Ok(pipeline)
    }
}
