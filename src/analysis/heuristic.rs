//! Offline English annotator for deployments without an annotation service.
//!
//! It is deliberately shallow: capitalisation marks proper nouns, a short
//! suffix table marks verbs, and lemmas come from suffix stripping. Good enough
//! to pull the content words out of a one-sentence claim.

use anyhow::Result;
use unicode_segmentation::UnicodeSegmentation;

use super::{AnalyzedText, Analyzer, EntitySpan, Pos, Token};

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "before", "being", "but", "by", "can", "could", "did", "do", "does", "doing", "done",
    "for", "from", "get", "had", "has", "have", "he", "her", "him", "his", "how", "i", "if", "in",
    "into", "is", "it", "its", "me", "more", "most", "my", "no", "not", "of", "on", "or", "our",
    "out", "over", "she", "so", "some", "than", "that", "the", "their", "them", "then", "there",
    "these", "they", "this", "those", "to", "too", "under", "up", "very", "was", "we", "were",
    "what", "when", "where", "which", "while", "who", "whom", "why", "will", "with", "would",
    "you", "your",
];

/// Base forms that are verbs even without a telltale suffix.
const COMMON_VERBS: &[&str] = &[
    "boil", "build", "cause", "contain", "cure", "die", "discover", "exist", "found", "invent",
    "kill", "live", "make", "marry", "orbit", "prevent", "win", "write",
];

pub fn segment_sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn is_stopword(lower: &str) -> bool {
    STOPWORDS.contains(&lower)
}

fn is_capitalized(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn is_numeric(word: &str) -> bool {
    word.parse::<f64>().is_ok() || word.chars().all(|c| c.is_ascii_digit() || c == ',')
}

fn strip<'a>(word: &'a str, suffix: &str, min_len: usize) -> Option<&'a str> {
    if word.len() >= min_len {
        word.strip_suffix(suffix)
    } else {
        None
    }
}

/// `runn` -> `run`, `stopp` -> `stop`; `fall`, `pass` and `buzz` keep their pair.
fn undouble(stem: &str) -> &str {
    let mut tail = stem.chars().rev();
    match (tail.next(), tail.next()) {
        (Some(last), Some(prev))
            if last == prev && last.is_ascii_alphabetic() && !"aeioulsfz".contains(last) =>
        {
            &stem[..stem.len() - last.len_utf8()]
        }
        _ => stem,
    }
}

fn verb_lemma(lower: &str) -> String {
    if let Some(stem) = strip(lower, "ied", 5) {
        return format!("{stem}y");
    }
    if let Some(stem) = strip(lower, "ing", 6).or_else(|| strip(lower, "ed", 5)) {
        return undouble(stem).to_string();
    }
    if let Some(stem) = strip(lower, "ies", 5) {
        return format!("{stem}y");
    }
    if !lower.ends_with("ss") {
        if let Some(stem) = strip(lower, "s", 4) {
            return stem.to_string();
        }
    }
    lower.to_string()
}

fn noun_lemma(lower: &str) -> String {
    if let Some(stem) = strip(lower, "ies", 5) {
        return format!("{stem}y");
    }
    if ["ss", "us", "is"].iter().any(|s| lower.ends_with(s)) {
        return lower.to_string();
    }
    strip(lower, "s", 4).unwrap_or(lower).to_string()
}

fn looks_like_verb(lower: &str) -> bool {
    strip(lower, "ing", 6).is_some()
        || strip(lower, "ed", 5).is_some()
        || COMMON_VERBS.contains(&verb_lemma(lower).as_str())
}

fn annotate_sentence(sentence: &str, out: &mut AnalyzedText) {
    let words: Vec<&str> = sentence.unicode_words().collect();
    let mut run: Vec<&str> = Vec::new();

    for (i, word) in words.iter().copied().enumerate() {
        let lower = word.to_lowercase();
        let is_stop = is_stopword(&lower);
        let next_capitalized = words
            .get(i + 1)
            .is_some_and(|w| is_capitalized(w) && !is_stopword(&w.to_lowercase()));

        let pos = if is_numeric(word) {
            Pos::Num
        } else if is_stop {
            Pos::Other
        } else if is_capitalized(word) && (i > 0 || next_capitalized) {
            Pos::Propn
        } else if looks_like_verb(&lower) {
            Pos::Verb
        } else {
            Pos::Noun
        };

        let lemma = match pos {
            Pos::Verb => verb_lemma(&lower),
            Pos::Noun => noun_lemma(&lower),
            Pos::Propn => word.to_string(),
            _ => lower,
        };

        if pos == Pos::Propn {
            run.push(word);
        } else if !run.is_empty() {
            out.ents.push(EntitySpan { text: run.join(" "), label: "PROPN".into() });
            run.clear();
        }

        out.tokens.push(Token { text: word.to_string(), pos, lemma, is_stop });
    }
    if !run.is_empty() {
        out.ents.push(EntitySpan { text: run.join(" "), label: "PROPN".into() });
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicAnalyzer;

impl HeuristicAnalyzer {
    pub fn annotate(&self, text: &str) -> AnalyzedText {
        let mut doc = AnalyzedText::default();
        for sentence in segment_sentences(text) {
            annotate_sentence(&sentence, &mut doc);
        }
        doc
    }
}

#[async_trait::async_trait]
impl Analyzer for HeuristicAnalyzer {
    async fn analyze(&self, text: &str) -> Result<AnalyzedText> {
        Ok(self.annotate(text))
    }
}
