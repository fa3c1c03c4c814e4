use thiserror::Error;

/// Failures that end a verification request.
///
/// Search backend failures are deliberately absent: they degrade to an empty
/// evidence list instead of surfacing here.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("claim is empty")]
    EmptyClaim,

    /// The generative query backend was unreachable or answered non-2xx.
    #[error("retrieval error: {0}")]
    Retrieval(String),

    #[error("linguistic analysis failed: {0}")]
    Analysis(String),

    /// Classification of evidence #`index` failed; no partial results are kept.
    #[error("classification failed for evidence #{index}: {message}")]
    Classification { index: usize, message: String },

    #[error("configuration error: {0}")]
    Config(String),
}

impl VerifyError {
    pub fn retrieval(err: impl Into<anyhow::Error>) -> Self {
        Self::Retrieval(format!("{:#}", err.into()))
    }

    pub fn analysis(err: impl Into<anyhow::Error>) -> Self {
        Self::Analysis(format!("{:#}", err.into()))
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Stable machine-readable name, used in JSON failure bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            VerifyError::EmptyClaim => "empty_claim",
            VerifyError::Retrieval(_) => "retrieval",
            VerifyError::Analysis(_) => "analysis",
            VerifyError::Classification { .. } => "classification",
            VerifyError::Config(_) => "config",
        }
    }
}
