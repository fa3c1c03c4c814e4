//! Claim verification: build a search query from a claim, retrieve web
//! evidence, and score each piece of evidence with a zero-shot NLI model.

pub mod analysis;
pub mod config;
pub mod error;
pub mod llm;
pub mod nli;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod retrieve;
pub mod scoring;
pub mod search;
pub mod server;
pub mod types;

pub use error::VerifyError;
pub use pipeline::Pipeline;
pub use report::{Outcome, Verdict, VerificationReport};
pub use types::*;
