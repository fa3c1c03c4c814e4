#![allow(dead_code)]

use anyhow::Result;
use async_openai::types::ChatCompletionRequestMessage;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use claimcheck_rs::llm::Llm;
use claimcheck_rs::nli::{Classification, NliClassifier};
use claimcheck_rs::query::GenerativeQueryBuilder;
use claimcheck_rs::search::{SearchHit, Searcher};
use claimcheck_rs::Pipeline;

pub struct FakeLlm {
    pub reply: String,
}

#[async_trait]
impl Llm for FakeLlm {
    async fn chat(&self, _messages: Vec<ChatCompletionRequestMessage>) -> Result<String> {
        Ok(self.reply.clone())
    }
}

/// Returns canned hits and records every query it receives.
#[derive(Default)]
pub struct FakeSearcher {
    pub results: Vec<SearchHit>,
    pub fail: bool,
    pub queries: Mutex<Vec<String>>,
}

impl FakeSearcher {
    pub fn with(results: Vec<SearchHit>) -> Self {
        Self { results, ..Default::default() }
    }
}

#[async_trait]
impl Searcher for FakeSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail {
            anyhow::bail!("search backend returned 500");
        }
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

/// Deterministic stand-in for an MNLI model: keyword rules on the premise.
#[derive(Default)]
pub struct RuleNli {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl RuleNli {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NliClassifier for RuleNli {
    async fn classify(&self, premise: &str, _labels: &[&str], _template: &str) -> Result<Classification> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("inference endpoint overloaded");
        }
        let ranked: [(&str, f32); 3] = if premise.contains("Paris") {
            [("contradiction", 0.94), ("neutral", 0.04), ("entailment", 0.02)]
        } else if premise.contains("100 degrees Celsius") {
            [("entailment", 0.88), ("neutral", 0.1), ("contradiction", 0.02)]
        } else {
            [("neutral", 0.7), ("entailment", 0.2), ("contradiction", 0.1)]
        };
        Ok(Classification {
            labels: ranked.iter().map(|(l, _)| l.to_string()).collect(),
            scores: ranked.iter().map(|(_, s)| *s).collect(),
        })
    }
}

pub fn hit(title: &str, link: &str) -> SearchHit {
    SearchHit { title: title.into(), link: link.into() }
}

pub fn pipeline(reply: &str, searcher: Arc<FakeSearcher>, nli: Arc<RuleNli>) -> Pipeline {
    let builder = GenerativeQueryBuilder::new(Arc::new(FakeLlm { reply: reply.into() }));
    Pipeline::new(Arc::new(builder), searcher, nli)
}
