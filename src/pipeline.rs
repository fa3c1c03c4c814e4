use futures::{stream, StreamExt};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::VerifyError;
use crate::nli::NliClassifier;
use crate::query::{build_query, QueryBuilder};
use crate::report::VerificationReport;
use crate::retrieve::retrieve_evidence;
use crate::scoring::score_evidence;
use crate::search::Searcher;
use crate::types::{Evidence, EvidenceItem, SearchQuery};

pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Query builder -> retriever -> scorer, with long-lived backends injected once.
///
/// Cheap to clone; every `verify` call is independent of every other.
#[derive(Clone)]
pub struct Pipeline {
    query_builder: Arc<dyn QueryBuilder>,
    searcher: Arc<dyn Searcher>,
    classifier: Arc<dyn NliClassifier>,
    max_results: usize,
}

impl Pipeline {
    pub fn new(
        query_builder: Arc<dyn QueryBuilder>,
        searcher: Arc<dyn Searcher>,
        classifier: Arc<dyn NliClassifier>,
    ) -> Self {
        Self { query_builder, searcher, classifier, max_results: DEFAULT_MAX_RESULTS }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    pub async fn query(&self, claim: &str) -> Result<SearchQuery, VerifyError> {
        if claim.trim().is_empty() {
            return Err(VerifyError::EmptyClaim);
        }
        build_query(self.query_builder.as_ref(), claim).await
    }

    pub async fn retrieve(&self, query: &str) -> Vec<EvidenceItem> {
        retrieve_evidence(self.searcher.as_ref(), query, self.max_results).await
    }

    #[instrument(skip(self), fields(max_results = self.max_results))]
    pub async fn verify(&self, claim: &str) -> Result<VerificationReport, VerifyError> {
        let query = self.query(claim).await?;
        let evidence = self.retrieve(&query.text).await;

        if evidence.is_empty() {
            info!("no evidence retrieved; skipping consistency scoring");
            return Ok(VerificationReport::NoEvidence { claim: claim.to_string(), query });
        }

        let evidence: Vec<Evidence> = evidence.into_iter().map(Evidence::from).collect();
        let judgments = score_evidence(self.classifier.as_ref(), claim, &evidence).await?;
        Ok(VerificationReport::Judged { claim: claim.to_string(), query, judgments })
    }

    /// Verifies independent claims concurrently; results keep the input order.
    pub async fn verify_many(
        &self,
        claims: &[String],
        concurrency: usize,
    ) -> Vec<Result<VerificationReport, VerifyError>> {
        let tasks = claims.iter().cloned().map(|claim| {
            let this = self.clone();
            async move { this.verify(&claim).await }
        });
        stream::iter(tasks)
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}
