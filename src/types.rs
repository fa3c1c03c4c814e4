use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A ranked web search result offered as evidence for or against a claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceItem {
    pub title: String,
    pub url: String,
}

/// Scorer input: a structured search result or a bare piece of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evidence {
    Item(EvidenceItem),
    Text(String),
}

impl Evidence {
    /// Premise handed to the NLI model: the title for search results.
    pub fn text(&self) -> &str {
        match self {
            Evidence::Item(item) => &item.title,
            Evidence::Text(text) => text,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match self {
            Evidence::Item(item) => Some(&item.url),
            Evidence::Text(_) => None,
        }
    }
}

impl From<EvidenceItem> for Evidence {
    fn from(item: EvidenceItem) -> Self {
        Evidence::Item(item)
    }
}

impl From<String> for Evidence {
    fn from(text: String) -> Self {
        Evidence::Text(text)
    }
}

impl From<&str> for Evidence {
    fn from(text: &str) -> Self {
        Evidence::Text(text.to_string())
    }
}

/// Which strategy produced the query that was actually sent to search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuerySource {
    Linguistic,
    Generative,
    /// The candidate was too short and the raw claim was used instead.
    Claim,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    pub source: QuerySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NliLabel {
    Entailment,
    Neutral,
    Contradiction,
}

impl NliLabel {
    /// Candidate labels in the order they are offered to the classifier.
    pub const ALL: [NliLabel; 3] = [NliLabel::Entailment, NliLabel::Neutral, NliLabel::Contradiction];

    pub fn as_str(&self) -> &'static str {
        match self {
            NliLabel::Entailment => "entailment",
            NliLabel::Neutral => "neutral",
            NliLabel::Contradiction => "contradiction",
        }
    }
}

impl fmt::Display for NliLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NliLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entailment" => Ok(NliLabel::Entailment),
            "neutral" => Ok(NliLabel::Neutral),
            "contradiction" => Ok(NliLabel::Contradiction),
            other => Err(format!("unknown NLI label '{other}'")),
        }
    }
}

/// One scored evidence entry. `confidence` is the model's probability for `label`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgmentRecord {
    pub evidence_text: String,
    pub url: Option<String>,
    pub label: NliLabel,
    pub confidence: f32,
}
