//! Subject classification through a text-generation service.
//!
//! The prompt is built from the most frequent persons, locations and topics
//! of a processed document; the service answers with the school subject.

mod gemini;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entity::RankedEntityList;
use crate::usage::UsageTracker;

pub use gemini::{
    Candidate, Content, GeminiClient, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Part, UsageMetadata,
};

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("API key not found. Set the {0} environment variable")]
    MissingApiKey(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("Service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Empty response from {0}")]
    EmptyResponse(String),
    #[error("Nothing to classify")]
    NothingToClassify,
}

pub type ClassifyResult<T> = Result<T, ClassifyError>;

/// One completion and the token counts the service reported for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    fn service_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> ClassifyResult<Generation>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectClassification {
    pub subject: String,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
}

pub struct SubjectClassifier {
    generator: Arc<dyn TextGenerator>,
    usage: Option<Arc<UsageTracker>>,
    top_n: usize,
}

impl SubjectClassifier {
    #[must_use]
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            usage: None,
            top_n: 5,
        }
    }

    #[must_use]
    pub fn with_usage_tracker(mut self, usage: Arc<UsageTracker>) -> Self {
        self.usage = Some(usage);
        self
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// `None` when there is nothing to describe the document with.
    #[must_use]
    pub fn build_prompt(
        &self,
        persons: &RankedEntityList,
        locations: &RankedEntityList,
        topics: &[String],
    ) -> Option<String> {
        let persons = join_names(persons, self.top_n);
        let locations = join_names(locations, self.top_n);
        let topics = topics
            .iter()
            .take(self.top_n)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("; ");

        if persons.is_empty() && locations.is_empty() && topics.is_empty() {
            return None;
        }

        Some(format!(
            "Un documento di studio cita questi elementi.\n\
             Persone: {persons}\n\
             Luoghi: {locations}\n\
             Argomenti: {topics}\n\
             Indica la materia scolastica del documento (per esempio storia, geografia, \
             letteratura, filosofia, scienze). Rispondi con una sola parola."
        ))
    }

    pub async fn classify(
        &self,
        persons: &RankedEntityList,
        locations: &RankedEntityList,
        topics: &[String],
    ) -> ClassifyResult<SubjectClassification> {
        let prompt = self
            .build_prompt(persons, locations, topics)
            .ok_or(ClassifyError::NothingToClassify)?;

        let generation = self.generator.generate(&prompt).await?;
        let service = self.generator.service_name().to_string();

        if let Some(usage) = &self.usage {
            usage.record(
                &service,
                generation.input_tokens.unwrap_or(0),
                generation.output_tokens.unwrap_or(0),
            );
        }

        let subject = parse_subject(&generation.text)
            .ok_or_else(|| ClassifyError::EmptyResponse(service.clone()))?;

        Ok(SubjectClassification {
            subject,
            service,
            input_tokens: generation.input_tokens,
            output_tokens: generation.output_tokens,
        })
    }
}

fn join_names(list: &RankedEntityList, n: usize) -> String {
    list.top(n)
        .iter()
        .map(|e| e.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

// First non-empty line, without surrounding quotes or final punctuation.
fn parse_subject(text: &str) -> Option<String> {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty())?;
    let subject = line
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '*' | '`' | '«' | '»'))
        .trim_end_matches(['.', '!', ';', ':'])
        .trim();

    (!subject.is_empty()).then(|| subject.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubGenerator {
        reply: Option<&'static str>,
        prompts: Mutex<Vec<String>>,
    }

    impl StubGenerator {
        fn replying(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl TextGenerator for StubGenerator {
        fn service_name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, prompt: &str) -> ClassifyResult<Generation> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match self.reply {
                Some(text) => Ok(Generation {
                    text: text.to_string(),
                    input_tokens: Some(30),
                    output_tokens: Some(2),
                }),
                None => Err(ClassifyError::Status {
                    status: 503,
                    body: "unavailable".into(),
                }),
            }
        }
    }

    fn entities(names: &[(&str, usize)]) -> RankedEntityList {
        RankedEntityList::from_counts(names.iter().map(|(n, c)| ((*n).to_string(), *c)).collect())
    }

    #[tokio::test]
    async fn test_classify_records_usage() {
        let stub = StubGenerator::replying("  \"Storia.\"\n");
        let tracker = Arc::new(UsageTracker::new());
        let classifier = SubjectClassifier::new(stub.clone()).with_usage_tracker(tracker.clone());

        let result = classifier
            .classify(
                &entities(&[("Cesare", 3)]),
                &entities(&[("Roma", 2)]),
                &["0.300*\"impero\"".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(result.subject, "Storia");
        assert_eq!(result.service, "stub");
        assert_eq!(result.input_tokens, Some(30));

        let usage = tracker.snapshot();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].total_input_tokens, 30);
        assert_eq!(usage[0].total_output_tokens, 2);

        let prompts = stub.prompts.lock().unwrap();
        assert!(prompts[0].contains("Persone: Cesare"));
        assert!(prompts[0].contains("Luoghi: Roma"));
    }

    #[test]
    fn test_prompt_truncates_to_top_n() {
        let classifier = SubjectClassifier::new(StubGenerator::replying("x")).with_top_n(2);
        let prompt = classifier
            .build_prompt(
                &entities(&[("Cesare", 3), ("Bruto", 2), ("Cassio", 1)]),
                &RankedEntityList::default(),
                &[],
            )
            .unwrap();

        assert!(prompt.contains("Persone: Cesare, Bruto\n"));
        assert!(!prompt.contains("Cassio"));
    }

    #[tokio::test]
    async fn test_nothing_to_classify() {
        let stub = StubGenerator::replying("Storia");
        let classifier = SubjectClassifier::new(stub.clone());
        let empty = RankedEntityList::default();

        let err = classifier.classify(&empty, &empty, &[]).await.unwrap_err();
        assert!(matches!(err, ClassifyError::NothingToClassify));
        assert!(stub.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_generator_failure_records_nothing() {
        let tracker = Arc::new(UsageTracker::new());
        let classifier =
            SubjectClassifier::new(StubGenerator::failing()).with_usage_tracker(tracker.clone());

        let err = classifier
            .classify(&entities(&[("Dante", 1)]), &RankedEntityList::default(), &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ClassifyError::Status { status: 503, .. }));
        assert!(tracker.snapshot().is_empty());
    }

    #[test]
    fn test_parse_subject() {
        assert_eq!(parse_subject("\n\n**Geografia**\naltro"), Some("Geografia".into()));
        assert_eq!(parse_subject("   \n "), None);
    }
}
