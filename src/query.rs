use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::analysis::{AnalyzedText, Analyzer, Pos};
use crate::error::VerifyError;
use crate::llm::Llm;
use crate::types::{QuerySource, SearchQuery};

/// Queries with fewer whitespace-separated tokens are replaced by the claim.
pub const MIN_QUERY_TOKENS: usize = 3;

const QUERY_SYSTEM_PROMPT: &str =
    "You are an assistant that generates concise and effective Google search queries from user claims.";

#[async_trait::async_trait]
pub trait QueryBuilder: Send + Sync {
    fn source(&self) -> QuerySource;

    /// Produces a candidate query; may be empty or terse.
    async fn build(&self, claim: &str) -> Result<String, VerifyError>;
}

/// Runs `builder` and applies the short-query fallback.
pub async fn build_query(builder: &dyn QueryBuilder, claim: &str) -> Result<SearchQuery, VerifyError> {
    let candidate = builder.build(claim).await?;
    let query = apply_fallback(claim, candidate, builder.source());
    info!(query = %query.text, source = ?query.source, "search query ready");
    Ok(query)
}

pub fn apply_fallback(claim: &str, candidate: String, source: QuerySource) -> SearchQuery {
    if candidate.split_whitespace().count() < MIN_QUERY_TOKENS {
        debug!(candidate = %candidate, "query too short, falling back to the claim");
        return SearchQuery { text: claim.to_string(), source: QuerySource::Claim };
    }
    SearchQuery { text: candidate, source }
}

/// Collects entities, proper nouns, verbs, nouns and lemmas, in that order,
/// keeping the first occurrence of each exact string.
pub fn extract_terms(doc: &AnalyzedText) -> Vec<String> {
    let content = move |pos: Pos| {
        doc.tokens
            .iter()
            .filter(move |t| t.pos == pos && !t.is_stop)
            .map(|t| t.text.as_str())
    };
    let entities = doc.ents.iter().map(|e| e.text.as_str());
    let propn = doc.tokens.iter().filter(|t| t.pos == Pos::Propn).map(|t| t.text.as_str());
    let lemmas = doc
        .tokens
        .iter()
        .filter(|t| matches!(t.pos, Pos::Verb | Pos::Noun) && !t.is_stop)
        .map(|t| t.lemma.as_str());

    let mut seen = HashSet::new();
    entities
        .chain(propn)
        .chain(content(Pos::Verb))
        .chain(content(Pos::Noun))
        .chain(lemmas)
        .filter(|term| !term.is_empty() && seen.insert(*term))
        .map(str::to_string)
        .collect()
}

pub struct LinguisticQueryBuilder {
    analyzer: Arc<dyn Analyzer>,
}

impl LinguisticQueryBuilder {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self { analyzer }
    }
}

#[async_trait::async_trait]
impl QueryBuilder for LinguisticQueryBuilder {
    fn source(&self) -> QuerySource {
        QuerySource::Linguistic
    }

    async fn build(&self, claim: &str) -> Result<String, VerifyError> {
        let doc = self.analyzer.analyze(claim).await.map_err(VerifyError::analysis)?;
        Ok(extract_terms(&doc).join(" "))
    }
}

fn build_query_prompt(claim: &str) -> Result<Vec<ChatCompletionRequestMessage>, VerifyError> {
    let system = ChatCompletionRequestSystemMessageArgs::default()
        .content(QUERY_SYSTEM_PROMPT)
        .build()
        .map_err(VerifyError::retrieval)?
        .into();
    let user = ChatCompletionRequestUserMessageArgs::default()
        .content(claim)
        .build()
        .map_err(VerifyError::retrieval)?
        .into();
    Ok(vec![system, user])
}

pub struct GenerativeQueryBuilder {
    llm: Arc<dyn Llm>,
}

impl GenerativeQueryBuilder {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }
}

#[async_trait::async_trait]
impl QueryBuilder for GenerativeQueryBuilder {
    fn source(&self) -> QuerySource {
        QuerySource::Generative
    }

    async fn build(&self, claim: &str) -> Result<String, VerifyError> {
        let prompt = build_query_prompt(claim)?;
        let out = self.llm.chat(prompt).await.map_err(VerifyError::retrieval)?;
        Ok(out.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{EntitySpan, HeuristicAnalyzer, Token};
    use std::sync::Mutex;

    struct FakeLlm {
        reply: anyhow::Result<&'static str>,
        seen: Mutex<Vec<usize>>,
    }

    #[async_trait::async_trait]
    impl Llm for FakeLlm {
        async fn chat(&self, messages: Vec<ChatCompletionRequestMessage>) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(messages.len());
            match &self.reply {
                Ok(s) => Ok(s.to_string()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    fn tok(text: &str, pos: Pos, lemma: &str, is_stop: bool) -> Token {
        Token { text: text.into(), pos, lemma: lemma.into(), is_stop }
    }

    #[test]
    fn fallback_replaces_short_queries() {
        let q = apply_fallback("does X exist", "x y".into(), QuerySource::Generative);
        assert_eq!(q, SearchQuery { text: "does X exist".into(), source: QuerySource::Claim });

        let q = apply_fallback("claim", "   ".into(), QuerySource::Linguistic);
        assert_eq!(q.text, "claim");

        let q = apply_fallback("claim", "a b c".into(), QuerySource::Linguistic);
        assert_eq!(q, SearchQuery { text: "a b c".into(), source: QuerySource::Linguistic });
    }

    #[test]
    fn terms_follow_priority_order_without_duplicates() {
        let doc = AnalyzedText {
            tokens: vec![
                tok("Vasan", Pos::Propn, "Vasan", false),
                tok("got", Pos::Verb, "get", true),
                tok("married", Pos::Verb, "marry", false),
                tok("wedding", Pos::Noun, "wedding", false),
                tok("weddings", Pos::Noun, "wedding", false),
            ],
            ents: vec![EntitySpan { text: "TTF Vasan".into(), label: "PERSON".into() }],
        };
        let terms = extract_terms(&doc);
        assert_eq!(terms, vec!["TTF Vasan", "Vasan", "married", "wedding", "weddings", "marry"]);

        let unique: HashSet<_> = terms.iter().collect();
        assert_eq!(unique.len(), terms.len());
    }

    #[test]
    fn empty_analysis_yields_empty_terms() {
        assert!(extract_terms(&AnalyzedText::default()).is_empty());
    }

    #[tokio::test]
    async fn linguistic_builder_joins_terms() {
        let builder = LinguisticQueryBuilder::new(Arc::new(HeuristicAnalyzer));
        let q = build_query(&builder, "The Eiffel Tower is in Berlin").await.unwrap();
        assert_eq!(q.source, QuerySource::Linguistic);
        assert!(q.text.starts_with("Eiffel Tower Berlin"));
    }

    #[tokio::test]
    async fn linguistic_builder_falls_back_on_stopword_claims() {
        let builder = LinguisticQueryBuilder::new(Arc::new(HeuristicAnalyzer));
        let q = build_query(&builder, "is it so").await.unwrap();
        assert_eq!(q, SearchQuery { text: "is it so".into(), source: QuerySource::Claim });
    }

    #[tokio::test]
    async fn generative_builder_trims_and_keeps_long_queries() {
        let llm = Arc::new(FakeLlm { reply: Ok("  ttf vasan marriage news \n"), seen: Mutex::new(vec![]) });
        let builder = GenerativeQueryBuilder::new(llm.clone());
        let q = build_query(&builder, "does ttf vasan got married").await.unwrap();
        assert_eq!(q, SearchQuery { text: "ttf vasan marriage news".into(), source: QuerySource::Generative });
        assert_eq!(*llm.seen.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn generative_two_token_reply_falls_back_to_claim() {
        let llm = Arc::new(FakeLlm { reply: Ok("x y"), seen: Mutex::new(vec![]) });
        let q = build_query(&GenerativeQueryBuilder::new(llm), "does X exist").await.unwrap();
        assert_eq!(q.text, "does X exist");
        assert_eq!(q.source, QuerySource::Claim);
    }

    #[tokio::test]
    async fn generative_backend_failure_propagates() {
        let llm = Arc::new(FakeLlm { reply: Err(anyhow::anyhow!("503 Service Unavailable")), seen: Mutex::new(vec![]) });
        let err = build_query(&GenerativeQueryBuilder::new(llm), "does X exist").await.unwrap_err();
        assert!(matches!(err, VerifyError::Retrieval(ref m) if m.contains("503")), "{err}");
    }
}
