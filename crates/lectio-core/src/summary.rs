//! Extractive summaries.
//!
//! Every noun and proper noun counts once per occurrence; a sentence scores
//! the sum of the counts of the words it contains. The best sentences are
//! returned in document order.

use std::collections::HashMap;

use crate::language::{AnalyzedText, LanguageResult, SharedPipeline};

pub const DEFAULT_SENTENCES: usize = 3;

pub struct Summarizer {
    pipeline: SharedPipeline,
    sentences: usize,
}

impl Summarizer {
    #[must_use]
    pub fn new(pipeline: SharedPipeline) -> Self {
        Self {
            pipeline,
            sentences: DEFAULT_SENTENCES,
        }
    }

    #[must_use]
    pub fn with_sentences(mut self, sentences: usize) -> Self {
        self.sentences = sentences;
        self
    }

    pub fn summarize(&self, text: &str) -> LanguageResult<String> {
        let doc = self.pipeline.analyze(text)?;
        Ok(summarize_analyzed(&doc, self.sentences))
    }
}

/// Summary of an already analyzed text. Sentences without any noun are never
/// selected; ties go to the earlier sentence.
#[must_use]
pub fn summarize_analyzed(doc: &AnalyzedText, sentences: usize) -> String {
    let mut frequency: HashMap<String, usize> = HashMap::new();
    for token in doc.tokens.iter().filter(|t| t.pos.is_nominal()) {
        *frequency.entry(token.text.to_lowercase()).or_default() += 1;
    }

    let mut scored: Vec<(usize, usize)> = doc
        .sentences
        .iter()
        .enumerate()
        .filter_map(|(idx, sentence)| {
            let score: usize = doc
                .sentence_tokens(sentence)
                .iter()
                .filter_map(|t| frequency.get(&t.text.to_lowercase()))
                .sum();
            (score > 0).then_some((idx, score))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.truncate(sentences);
    scored.sort_by_key(|&(idx, _)| idx);

    scored
        .iter()
        .map(|&(idx, _)| doc.sentences[idx].text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::default_pipeline;

    #[test]
    fn test_picks_densest_sentences_in_order() {
        let text = "Roma fondò colonie in Italia. Poi venne la pace. \
                    Roma combatté Cartagine per la Sicilia e Roma vinse. \
                    Tutto finì bene.";
        let summary = Summarizer::new(default_pipeline())
            .with_sentences(2)
            .summarize(text)
            .unwrap();

        assert_eq!(
            summary,
            "Roma fondò colonie in Italia. Roma combatté Cartagine per la Sicilia e Roma vinse."
        );
    }

    #[test]
    fn test_sentences_without_nouns_are_skipped() {
        let summary = Summarizer::new(default_pipeline())
            .summarize("Il console partì. E poi? Mai più.")
            .unwrap();
        assert_eq!(summary, "Il console partì.");
    }

    #[test]
    fn test_empty_text() {
        let summary = Summarizer::new(default_pipeline()).summarize("").unwrap();
        assert!(summary.is_empty());
    }
}
