//! Topic descriptors for a single document.
//!
//! Text is reduced to a bag of content lemmas (nouns and proper nouns minus
//! stopwords, short tokens and a domain stoplist), then an LDA model is fitted
//! over that one bag. With a single document this behaves like weighted
//! keyword extraction, which is what the descriptors are used for.

mod lda;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::TopicsConfig;
use crate::language::{LanguageError, SharedPipeline};

pub use lda::{digamma, Dictionary, LdaModel, LdaParams};

/// Generic filler of history texts, too frequent to describe a topic.
pub const DOMAIN_STOPWORDS: &[&str] = &["città", "secolo", "d.c", "a.c", "storia", "anni", "regno"];

const MIN_TOKEN_CHARS: usize = 3;

#[derive(Debug, Error)]
pub enum TopicError {
    #[error("Language analysis failed: {0}")]
    Language(#[from] LanguageError),
}

pub type TopicResult<T> = Result<T, TopicError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicTerm {
    pub word: String,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: usize,
    pub terms: Vec<TopicTerm>,
}

impl Topic {
    /// Weighted terms as `0.123*"impero" + 0.045*"legione"`.
    #[must_use]
    pub fn descriptor(&self) -> String {
        self.terms
            .iter()
            .map(|t| format!("{:.3}*\"{}\"", t.weight, t.word))
            .collect::<Vec<_>>()
            .join(" + ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicSet {
    pub topics: Vec<Topic>,
}

impl TopicSet {
    #[must_use]
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Topic> {
        self.topics.iter()
    }

    #[must_use]
    pub fn descriptors(&self) -> Vec<String> {
        self.topics.iter().map(Topic::descriptor).collect()
    }
}

pub struct TopicModeler {
    pipeline: SharedPipeline,
    config: TopicsConfig,
    stoplist: HashSet<String>,
}

impl TopicModeler {
    #[must_use]
    pub fn new(pipeline: SharedPipeline) -> Self {
        Self {
            pipeline,
            config: TopicsConfig::default(),
            stoplist: DOMAIN_STOPWORDS.iter().map(|w| (*w).to_string()).collect(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: TopicsConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_num_topics(mut self, num_topics: usize) -> Self {
        self.config.num_topics = num_topics;
        self
    }

    #[must_use]
    pub fn with_num_words(mut self, num_words: usize) -> Self {
        self.config.num_words = num_words;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Replace the domain stoplist.
    #[must_use]
    pub fn with_stoplist<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stoplist = words.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn config(&self) -> &TopicsConfig {
        &self.config
    }

    /// Content lemmas of `text`, in document order.
    pub fn preprocess(&self, text: &str) -> TopicResult<Vec<String>> {
        let lowered = text.to_lowercase();
        let doc = self.pipeline.analyze(&lowered)?;

        let lemmas = doc
            .tokens
            .iter()
            .filter(|token| token.pos.is_nominal())
            .filter(|token| {
                let surface = token.bare_text();
                surface.chars().count() >= MIN_TOKEN_CHARS
                    && !self.pipeline.is_stopword(surface)
                    && !self.stoplist.contains(surface.trim_end_matches('.'))
            })
            .map(|token| token.lemma.clone())
            .collect();

        Ok(lemmas)
    }

    /// Fit the configured number of topics. Returns an empty set when no
    /// content word survives filtering.
    pub fn extract_topics(&self, text: &str) -> TopicResult<TopicSet> {
        let tokens = self.preprocess(text)?;
        if tokens.is_empty() || self.config.num_topics == 0 {
            debug!(tokens = tokens.len(), "No topic model fitted");
            return Ok(TopicSet::default());
        }

        let dictionary = Dictionary::from_tokens(&tokens);
        let bow = dictionary.doc2bow(&tokens);
        let params = LdaParams {
            num_topics: self.config.num_topics,
            passes: self.config.passes,
            iterations: self.config.iterations,
            seed: self.config.seed,
        };
        let model = LdaModel::fit(&bow, dictionary.len(), &params);

        let topics = (0..model.num_topics())
            .map(|id| Topic {
                id,
                terms: model
                    .top_terms(id, self.config.num_words)
                    .into_iter()
                    .filter_map(|(term, weight)| {
                        dictionary.word(term).map(|word| TopicTerm {
                            word: word.to_string(),
                            weight,
                        })
                    })
                    .collect(),
            })
            .collect();

        debug!(
            tokens = tokens.len(),
            vocabulary = dictionary.len(),
            topics = model.num_topics(),
            eta = model.eta,
            "Fitted topic model"
        );

        Ok(TopicSet { topics })
    }
}
