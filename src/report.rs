use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::VerifyError;
use crate::types::{JudgmentRecord, NliLabel, SearchQuery};

/// Judgments below this confidence are treated as inconclusive by default.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

pub const NO_EVIDENCE_MESSAGE: &str = "No evidence retrieved to verify the claim.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum VerificationReport {
    Judged {
        claim: String,
        query: SearchQuery,
        judgments: Vec<JudgmentRecord>,
    },
    NoEvidence {
        claim: String,
        query: SearchQuery,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Supported,
    Refuted,
    Neutral,
    Inconclusive,
    NoEvidence,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Supported => "SUPPORTED",
            Verdict::Refuted => "REFUTED",
            Verdict::Neutral => "NEUTRAL",
            Verdict::Inconclusive => "INCONCLUSIVE",
            Verdict::NoEvidence => "NO EVIDENCE",
        };
        f.write_str(s)
    }
}

impl From<NliLabel> for Verdict {
    fn from(label: NliLabel) -> Self {
        match label {
            NliLabel::Entailment => Verdict::Supported,
            NliLabel::Contradiction => Verdict::Refuted,
            NliLabel::Neutral => Verdict::Neutral,
        }
    }
}

impl VerificationReport {
    pub fn claim(&self) -> &str {
        match self {
            VerificationReport::Judged { claim, .. } | VerificationReport::NoEvidence { claim, .. } => claim,
        }
    }

    pub fn query(&self) -> &SearchQuery {
        match self {
            VerificationReport::Judged { query, .. } | VerificationReport::NoEvidence { query, .. } => query,
        }
    }

    pub fn judgments(&self) -> &[JudgmentRecord] {
        match self {
            VerificationReport::Judged { judgments, .. } => judgments,
            VerificationReport::NoEvidence { .. } => &[],
        }
    }

    /// Confidence-weighted vote over judgments at or above `min_confidence`.
    /// A tie for first place is inconclusive.
    pub fn verdict(&self, min_confidence: f32) -> Verdict {
        let judgments = match self {
            VerificationReport::NoEvidence { .. } => return Verdict::NoEvidence,
            VerificationReport::Judged { judgments, .. } => judgments,
        };

        let mut totals = [0.0f32; 3];
        for j in judgments.iter().filter(|j| j.confidence >= min_confidence) {
            let slot = NliLabel::ALL.iter().position(|l| *l == j.label).unwrap_or_default();
            totals[slot] += j.confidence;
        }

        let best = totals.iter().copied().fold(0.0f32, f32::max);
        if best <= 0.0 {
            return Verdict::Inconclusive;
        }
        let mut winners = NliLabel::ALL.iter().zip(totals).filter(|(_, t)| *t == best);
        match (winners.next(), winners.next()) {
            (Some((label, _)), None) => Verdict::from(*label),
            _ => Verdict::Inconclusive,
        }
    }

    /// Human-readable report, one block per evidence in retrieval order.
    pub fn render(&self, min_confidence: f32) -> String {
        Rendered { report: self, min_confidence }.to_string()
    }
}

struct Rendered<'a> {
    report: &'a VerificationReport,
    min_confidence: f32,
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.report;
        writeln!(f, "Claim: {}", report.claim())?;
        writeln!(f, "Search query: {}", report.query().text)?;
        if let VerificationReport::NoEvidence { .. } = report {
            return writeln!(f, "{NO_EVIDENCE_MESSAGE}");
        }
        writeln!(f, "\n--- Verification Results ---")?;
        for j in report.judgments() {
            writeln!(f, "Evidence: \"{}\"", j.evidence_text)?;
            if let Some(url) = &j.url {
                writeln!(f, "URL: {url}")?;
            }
            let conclusion = j.label.as_str().to_uppercase();
            writeln!(f, "Conclusion: {conclusion} (Confidence: {:.2})", j.confidence)?;
            writeln!(f, "{}", "-".repeat(10))?;
        }
        writeln!(f, "Overall verdict: {}", report.verdict(self.min_confidence))
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Rendered { report: self, min_confidence: DEFAULT_MIN_CONFIDENCE }, f)
    }
}

/// Wire shape of a failed verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub status: String,
    pub kind: String,
    pub message: String,
}

impl From<&VerifyError> for Failure {
    fn from(err: &VerifyError) -> Self {
        Self { status: "failed".into(), kind: err.kind().into(), message: err.to_string() }
    }
}

/// Any of the three terminal states of a verification request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Report(VerificationReport),
    Failed(Failure),
}

impl From<Result<VerificationReport, VerifyError>> for Outcome {
    fn from(res: Result<VerificationReport, VerifyError>) -> Self {
        match res {
            Ok(report) => Outcome::Report(report),
            Err(err) => Outcome::Failed(Failure::from(&err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuerySource;

    fn judged(labels: &[(NliLabel, f32)]) -> VerificationReport {
        VerificationReport::Judged {
            claim: "c".into(),
            query: SearchQuery { text: "c".into(), source: QuerySource::Claim },
            judgments: labels
                .iter()
                .enumerate()
                .map(|(i, (label, confidence))| JudgmentRecord {
                    evidence_text: format!("e{i}"),
                    url: Some(format!("https://example.com/{i}")),
                    label: *label,
                    confidence: *confidence,
                })
                .collect(),
        }
    }

    #[test]
    fn verdict_weights_by_confidence() {
        use NliLabel::*;
        let r = judged(&[(Contradiction, 0.9), (Entailment, 0.55), (Entailment, 0.6)]);
        assert_eq!(r.verdict(0.5), Verdict::Supported);
        assert_eq!(r.verdict(0.58), Verdict::Refuted);
    }

    #[test]
    fn low_confidence_and_ties_are_inconclusive() {
        use NliLabel::*;
        assert_eq!(judged(&[(Entailment, 0.4)]).verdict(0.5), Verdict::Inconclusive);
        assert_eq!(judged(&[(Entailment, 0.7), (Contradiction, 0.7)]).verdict(0.5), Verdict::Inconclusive);
        assert_eq!(judged(&[(Neutral, 0.8)]).verdict(0.5), Verdict::Neutral);
    }

    #[test]
    fn no_evidence_is_explicit() {
        let r = VerificationReport::NoEvidence {
            claim: "c".into(),
            query: SearchQuery { text: "c".into(), source: QuerySource::Claim },
        };
        assert_eq!(r.verdict(0.5), Verdict::NoEvidence);
        assert!(r.judgments().is_empty());
        assert!(r.to_string().contains(NO_EVIDENCE_MESSAGE));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["status"], "no_evidence");
    }

    #[test]
    fn render_lists_evidence_in_order() {
        let text = judged(&[(NliLabel::Contradiction, 0.934), (NliLabel::Neutral, 0.51)]).to_string();
        let first = text.find("Evidence: \"e0\"").unwrap();
        let second = text.find("Evidence: \"e1\"").unwrap();
        assert!(first < second);
        assert!(text.contains("URL: https://example.com/0"));
        assert!(text.contains("Conclusion: CONTRADICTION (Confidence: 0.93)"));
        assert!(text.contains("Overall verdict: REFUTED"));
        assert!(text.ends_with("Overall verdict: REFUTED\n"));
    }

    #[test]
    fn render_applies_the_given_threshold() {
        let r = judged(&[(NliLabel::Contradiction, 0.934), (NliLabel::Neutral, 0.51)]);
        assert_eq!(r.render(DEFAULT_MIN_CONFIDENCE), r.to_string());
        let strict = r.render(0.95);
        assert!(strict.starts_with("Claim: c\nSearch query: c\n\n--- Verification Results ---\n"));
        assert!(strict.ends_with("Overall verdict: INCONCLUSIVE\n"), "{strict}");
    }

    #[test]
    fn failures_serialize_with_kind() {
        let outcome = Outcome::from(Err::<VerificationReport, _>(VerifyError::EmptyClaim));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "empty_claim");
    }
}
