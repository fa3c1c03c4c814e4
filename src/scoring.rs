use tracing::{debug, instrument};

use crate::error::VerifyError;
use crate::nli::{Classification, NliClassifier};
use crate::types::{Evidence, JudgmentRecord, NliLabel};

pub const CANDIDATE_LABELS: [&str; 3] = ["entailment", "neutral", "contradiction"];

/// Hypothesis presented to the model; `{}` is the label slot.
///
/// Braces in the claim are doubled so the backend formats only our slot.
pub fn hypothesis_template(claim: &str) -> String {
    let claim = claim.replace('{', "{{").replace('}', "}}");
    format!("This text means that {claim}: {{}}")
}

/// Picks the highest-scoring label (first wins on ties).
fn top_label(c: &Classification) -> Result<(NliLabel, f32), String> {
    if c.labels.is_empty() {
        return Err("model returned no labels".into());
    }
    if c.labels.len() != c.scores.len() {
        return Err(format!("{} labels but {} scores", c.labels.len(), c.scores.len()));
    }
    if let Some(bad) = c.scores.iter().find(|s| !s.is_finite()) {
        return Err(format!("non-finite score {bad}"));
    }
    let mut best = 0;
    for (i, score) in c.scores.iter().enumerate().skip(1) {
        if *score > c.scores[best] {
            best = i;
        }
    }
    let label = c.labels[best].parse::<NliLabel>()?;
    Ok((label, c.scores[best].clamp(0.0, 1.0)))
}

/// Scores every evidence entry against `claim`, one model call per entry, in order.
///
/// The first failing entry aborts the whole batch.
#[instrument(skip_all, fields(evidence = evidence.len()))]
pub async fn score_evidence(
    classifier: &dyn NliClassifier,
    claim: &str,
    evidence: &[Evidence],
) -> Result<Vec<JudgmentRecord>, VerifyError> {
    let template = hypothesis_template(claim);
    let mut records = Vec::with_capacity(evidence.len());

    for (index, ev) in evidence.iter().enumerate() {
        let text = ev.text();
        let classification = classifier
            .classify(text, &CANDIDATE_LABELS, &template)
            .await
            .map_err(|e| VerifyError::Classification { index, message: format!("{e:#}") })?;
        let (label, confidence) =
            top_label(&classification).map_err(|message| VerifyError::Classification { index, message })?;
        debug!(index, %label, confidence, "evidence classified");
        records.push(JudgmentRecord {
            evidence_text: text.to_string(),
            url: ev.url().map(str::to_string),
            label,
            confidence,
        });
    }
    Ok(records)
}
