use tracing::{info, warn};

use crate::search::Searcher;
use crate::types::EvidenceItem;

/// Fetches at most `max_results` evidence items for `query`.
///
/// Backend failures are logged and reported as "no evidence" (an empty list).
pub async fn retrieve_evidence(searcher: &dyn Searcher, query: &str, max_results: usize) -> Vec<EvidenceItem> {
    match searcher.search(query, max_results).await {
        Ok(hits) => {
            let evidence: Vec<EvidenceItem> = hits
                .into_iter()
                .take(max_results)
                .map(|h| EvidenceItem { title: h.title, url: h.link })
                .collect();
            info!(found = evidence.len(), "evidence retrieved");
            evidence
        }
        Err(err) => {
            warn!(error = %format!("{err:#}"), query, "search backend failed; continuing without evidence");
            Vec::new()
        }
    }
}
