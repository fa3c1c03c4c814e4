//! Part-of-speech, lemma and named-entity annotations used by the linguistic
//! query strategy.

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod heuristic;
pub mod http;

pub use heuristic::HeuristicAnalyzer;
pub use http::HttpAnalyzer;

/// Universal POS tags the query builder cares about; everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Pos {
    Propn,
    Verb,
    Noun,
    Num,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub pos: Pos,
    pub lemma: String,
    pub is_stop: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzedText {
    #[serde(default)]
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub ents: Vec<EntitySpan>,
}

#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, text: &str) -> Result<AnalyzedText>;
}
