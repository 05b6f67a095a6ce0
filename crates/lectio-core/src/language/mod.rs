//! Linguistic analysis seam.
//!
//! Entity extraction, topic modeling and summarization all consume an
//! [`AnalyzedText`] produced by a [`LanguagePipeline`]. The pipeline is a
//! read-only resource: build it once, wrap it in an [`Arc`] and hand clones to
//! every component that needs it.

mod italian;
mod lexicon;

use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::EntityLabel;

pub use italian::HeuristicItalianPipeline;

#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("Language model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Input too long: {len} characters (max: {max})")]
    InputTooLong { len: usize, max: usize },
    #[error("Analysis failed: {0}")]
    Failed(String),
}

pub type LanguageResult<T> = Result<T, LanguageError>;

/// Coarse part-of-speech classes, close to the universal tag set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    Noun,
    Propn,
    Verb,
    Aux,
    Adj,
    Adv,
    Det,
    Adp,
    Pron,
    Conj,
    Num,
    Punct,
    Other,
}

impl PartOfSpeech {
    #[must_use]
    pub fn is_nominal(&self) -> bool {
        matches!(self, Self::Noun | Self::Propn)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Surface form without a trailing elision apostrophe (`dell'` -> `dell`).
    #[must_use]
    pub fn bare_text(&self) -> &str {
        self.text.trim_end_matches(['\'', '’'])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    pub text: String,
    pub start: usize,
    pub end: usize,
    /// Indices into [`AnalyzedText::tokens`].
    pub tokens: Range<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzedText {
    pub tokens: Vec<Token>,
    pub sentences: Vec<Sentence>,
    pub entities: Vec<EntitySpan>,
}

impl AnalyzedText {
    pub fn entities_labelled<'a>(
        &'a self,
        labels: &'a [EntityLabel],
    ) -> impl Iterator<Item = &'a EntitySpan> + 'a {
        self.entities.iter().filter(|e| labels.contains(&e.label))
    }

    #[must_use]
    pub fn sentence_tokens(&self, sentence: &Sentence) -> &[Token] {
        &self.tokens[sentence.tokens.clone()]
    }
}

pub trait LanguagePipeline: Send + Sync {
    fn name(&self) -> &'static str;

    fn analyze(&self, text: &str) -> LanguageResult<AnalyzedText>;

    /// Whether `word` (already lower-cased) is a stopword of the language.
    fn is_stopword(&self, word: &str) -> bool;
}

pub type SharedPipeline = Arc<dyn LanguagePipeline>;

/// The default pipeline shipped with the crate.
#[must_use]
pub fn default_pipeline() -> SharedPipeline {
    HeuristicItalianPipeline::shared()
}
