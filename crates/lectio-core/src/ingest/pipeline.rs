use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::extractor::{EntityExtractor, ExtractedEntities};
use super::normalizer::normalize_pages;
use super::parser::{CompositeParser, DocumentFormat, PageExtractor, ParseError, RawText};
use crate::classify::{ClassifyError, SubjectClassification, SubjectClassifier};
use crate::config::PipelineConfig;
use crate::entity::RankedEntityList;
use crate::language::{default_pipeline, LanguageError, SharedPipeline};
use crate::source::{Source, SourceType};
use crate::summary::summarize_analyzed;
use crate::topics::{TopicError, TopicModeler, TopicSet};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Language analysis failed: {0}")]
    Language(#[from] LanguageError),
    #[error("Topic modeling failed: {0}")]
    Topic(#[from] TopicError),
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Language(_) => FailureKind::Language,
            Self::Topic(_) => FailureKind::Topic,
            Self::Parse(ParseError::Io(_)) | Self::Io(_) => FailureKind::Io,
            Self::Parse(_) => FailureKind::Parse,
            Self::Task(_) => FailureKind::Task,
        }
    }
}

pub type ProcessResult<T> = Result<T, PipelineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Language,
    Topic,
    Parse,
    Task,
    Io,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessStats {
    pub pages: usize,
    pub characters: usize,
    pub persons: usize,
    pub locations: usize,
    pub topics: usize,
    pub duration_ms: u64,
}

/// Outcome of one pipeline invocation. Always produced, also on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,
    pub normalized_text: String,
    pub persons: RankedEntityList,
    pub locations: RankedEntityList,
    pub topics: Vec<String>,
    pub dates: Vec<String>,
    pub summary: String,
    pub subject: Option<SubjectClassification>,
    pub status: PipelineStatus,
    pub error_message: Option<String>,
    pub error_kind: Option<FailureKind>,
    pub stats: ProcessStats,
}

impl PipelineResult {
    fn empty(status: PipelineStatus) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: None,
            normalized_text: String::new(),
            persons: RankedEntityList::default(),
            locations: RankedEntityList::default(),
            topics: Vec::new(),
            dates: Vec::new(),
            summary: String::new(),
            subject: None,
            status,
            error_message: None,
            error_kind: None,
            stats: ProcessStats::default(),
        }
    }

    fn success(text: String, analysis: Analysis) -> Self {
        let Analysis {
            entities,
            summary,
            topics,
        } = analysis;

        let mut result = Self::empty(PipelineStatus::Success);
        result.stats.characters = text.chars().count();
        result.stats.persons = entities.persons.len();
        result.stats.locations = entities.locations.len();
        result.stats.topics = topics.len();
        result.normalized_text = text;
        result.persons = entities.persons;
        result.locations = entities.locations;
        result.dates = entities.dates;
        result.topics = topics.descriptors();
        result.summary = summary;
        result
    }

    #[must_use]
    pub fn failure(error: &PipelineError) -> Self {
        let mut result = Self::empty(PipelineStatus::Error);
        result.error_message = Some(error.to_string());
        result.error_kind = Some(error.kind());
        result
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == PipelineStatus::Success
    }

    #[must_use]
    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }
}

struct Analysis {
    entities: ExtractedEntities,
    summary: String,
    topics: TopicSet,
}

/// Normalizes pages, then runs entity extraction and topic modeling side by
/// side on the blocking pool. An attached classifier runs last.
pub struct DocumentPipeline {
    language: SharedPipeline,
    parser: Box<dyn PageExtractor>,
    config: PipelineConfig,
    classifier: Option<SubjectClassifier>,
}

impl DocumentPipeline {
    #[must_use]
    pub fn new() -> Self {
        Self {
            language: default_pipeline(),
            parser: Box::new(CompositeParser::default()),
            config: PipelineConfig::default(),
            classifier: None,
        }
    }

    #[must_use]
    pub fn with_language_pipeline(mut self, language: SharedPipeline) -> Self {
        self.language = language;
        self
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn PageExtractor>) -> Self {
        self.parser = parser;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: SubjectClassifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn process<S: AsRef<str>>(&self, pages: &[S]) -> PipelineResult {
        let start = Instant::now();
        let text = normalize_pages(pages, &self.config.pipeline.page_separator);

        info!(
            pages = pages.len(),
            characters = text.len(),
            pipeline = self.language.name(),
            "Processing document"
        );

        let mut result = match self.analyze(&text).await {
            Ok(analysis) => PipelineResult::success(text, analysis),
            Err(e) => {
                warn!(error = %e, "Pipeline failed");
                PipelineResult::failure(&e)
            }
        };

        if result.is_success() {
            result.subject = self.classify(&result).await;
        }

        result.stats.pages = pages.len();
        result.stats.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            id = %result.id,
            status = ?result.status,
            persons = result.stats.persons,
            locations = result.stats.locations,
            topics = result.stats.topics,
            duration_ms = result.stats.duration_ms,
            "Processed document"
        );

        result
    }

    async fn analyze(&self, text: &str) -> ProcessResult<Analysis> {
        let text: Arc<str> = Arc::from(text);

        let extractor = EntityExtractor::new(Arc::clone(&self.language));
        let sentences = self.config.summary.sentences;
        let entities_text = Arc::clone(&text);
        let entities_task = tokio::task::spawn_blocking(move || {
            let doc = extractor.pipeline().analyze(&entities_text)?;
            let entities = extractor.extract_analyzed(&doc, &entities_text);
            let summary = summarize_analyzed(&doc, sentences);
            Ok::<_, LanguageError>((entities, summary))
        });

        let modeler =
            TopicModeler::new(Arc::clone(&self.language)).with_config(self.config.topics.clone());
        let topics_task = tokio::task::spawn_blocking(move || modeler.extract_topics(&text));

        let (entities, topics) = tokio::join!(entities_task, topics_task);
        let (entities, summary) = entities??;
        let topics = topics??;

        Ok(Analysis {
            entities,
            summary,
            topics,
        })
    }

    async fn classify(&self, result: &PipelineResult) -> Option<SubjectClassification> {
        let classifier = self.classifier.as_ref()?;

        match classifier
            .classify(&result.persons, &result.locations, &result.topics)
            .await
        {
            Ok(subject) => {
                debug!(subject = %subject.subject, service = %subject.service, "Classified subject");
                Some(subject)
            }
            Err(ClassifyError::NothingToClassify) => {
                debug!("Nothing to classify");
                None
            }
            Err(e) => {
                warn!(error = %e, "Subject classification failed");
                None
            }
        }
    }

    /// Read `path` through the configured extractor and process its pages.
    /// Read failures are reported in the result, like any other failure.
    pub async fn process_file(&self, path: &Path) -> PipelineResult {
        let raw = match self.parser.extract_file(path).await {
            Ok(raw) => raw,
            Err(e) => {
                let e = PipelineError::from(e);
                warn!(path = %path.display(), error = %e, "Could not read document");
                return PipelineResult::failure(&e).with_source(source_for_path(path, None));
            }
        };

        let source = source_for_path(path, Some(&raw));
        let result = self.process(&raw.pages).await.with_source(source);

        if result.is_success() && self.config.pipeline.delete_source {
            match tokio::fs::remove_file(path).await {
                Ok(()) => info!(path = %path.display(), "Deleted source file"),
                Err(e) => warn!(path = %path.display(), error = %e, "Could not delete source file"),
            }
        }

        result
    }

    pub async fn process_files(&self, paths: &[&Path]) -> BatchProcessResult {
        let mut batch = BatchProcessResult::new();
        for path in paths {
            batch.add(self.process_file(path).await);
        }
        batch
    }

    /// Process every supported file directly inside `dir`, in name order.
    pub async fn process_directory(&self, dir: &Path) -> ProcessResult<BatchProcessResult> {
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let supported = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(DocumentFormat::from_extension)
                .is_some_and(|format| self.parser.can_parse(format));

            if supported {
                paths.push(path);
            } else {
                debug!(path = %path.display(), "Skipping unsupported file");
            }
        }

        paths.sort();
        let refs: Vec<&Path> = paths.iter().map(AsRef::as_ref).collect();
        Ok(self.process_files(&refs).await)
    }
}

impl Default for DocumentPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn source_for_path(path: &Path, raw: Option<&RawText>) -> Source {
    let title = raw
        .and_then(|r| r.title.clone())
        .or_else(|| path.file_name().and_then(|n| n.to_str()).map(String::from))
        .unwrap_or_default();
    let uri = path.to_string_lossy().to_string();

    let Some(raw) = raw else {
        let source_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(DocumentFormat::from_extension)
            .map_or(SourceType::Text, |f| f.source_type());
        return Source::file(source_type, title, uri);
    };

    Source::file(raw.format.source_type(), title, uri)
        .with_hash(compute_hash(&raw.pages.concat()))
        .with_page_count(u32::try_from(raw.page_count()).unwrap_or(u32::MAX))
}

#[must_use]
pub fn compute_hash(content: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[derive(Debug, Default)]
pub struct BatchProcessResult {
    pub successful: Vec<PipelineResult>,
    pub failed: Vec<PipelineResult>,
    pub total_stats: ProcessStats,
}

impl BatchProcessResult {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn add(&mut self, result: PipelineResult) {
        if result.is_success() {
            self.add_success(result);
        } else {
            self.add_failure(result);
        }
    }

    fn add_success(&mut self, result: PipelineResult) {
        self.total_stats.pages += result.stats.pages;
        self.total_stats.characters += result.stats.characters;
        self.total_stats.persons += result.stats.persons;
        self.total_stats.locations += result.stats.locations;
        self.total_stats.topics += result.stats.topics;
        self.total_stats.duration_ms += result.stats.duration_ms;
        self.successful.push(result);
    }

    fn add_failure(&mut self, result: PipelineResult) {
        self.total_stats.duration_ms += result.stats.duration_ms;
        self.failed.push(result);
    }

    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successful.len()
    }

    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// All results, successful first.
    pub fn results(&self) -> impl Iterator<Item = &PipelineResult> {
        self.successful.iter().chain(self.failed.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ClassifyResult, Generation, TextGenerator};
    use crate::entity::RankedEntity;
    use crate::language::{AnalyzedText, LanguagePipeline, LanguageResult};
    use crate::usage::UsageTracker;

    struct Broken;

    impl LanguagePipeline for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn analyze(&self, _text: &str) -> LanguageResult<AnalyzedText> {
            Err(LanguageError::Failed("tagger crashed".into()))
        }

        fn is_stopword(&self, _word: &str) -> bool {
            false
        }
    }

    struct Panicking;

    impl LanguagePipeline for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn analyze(&self, _text: &str) -> LanguageResult<AnalyzedText> {
            panic!("model exploded")
        }

        fn is_stopword(&self, _word: &str) -> bool {
            false
        }
    }

    struct Reply(Option<&'static str>);

    #[async_trait::async_trait]
    impl TextGenerator for Reply {
        fn service_name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, _prompt: &str) -> ClassifyResult<Generation> {
            match self.0 {
                Some(text) => Ok(Generation {
                    text: text.to_string(),
                    input_tokens: Some(12),
                    output_tokens: None,
                }),
                None => Err(ClassifyError::EmptyResponse("stub".into())),
            }
        }
    }

    const AUGUSTO: [&str; 2] = [
        "Augusto divenne imperatore.",
        "Ottaviano Augusto nacque nel 63 a.C. a Roma.",
    ];

    #[tokio::test]
    async fn test_augusto_scenario() {
        let result = DocumentPipeline::new().process(&AUGUSTO).await;

        assert!(result.is_success());
        assert_eq!(
            result.normalized_text,
            "Augusto divenne imperatore. Ottaviano Augusto nacque nel 63 a.C. a Roma."
        );
        assert_eq!(
            result.persons.as_slice()[0],
            RankedEntity::new("Ottaviano Augusto", 2)
        );
        assert_eq!(result.locations.names(), vec!["Roma"]);
        assert_eq!(result.dates, vec!["63 a.C.".to_string()]);
        assert_eq!(result.topics.len(), 1);
        assert!(!result.summary.is_empty());
        assert!(result.subject.is_none());
        assert_eq!(result.stats.pages, 2);
        assert_eq!(result.stats.persons, result.persons.len());
        assert!(result.error_message.is_none());
    }

    #[tokio::test]
    async fn test_empty_input() {
        let pipeline = DocumentPipeline::new();

        for result in [
            pipeline.process::<&str>(&[]).await,
            pipeline.process(&[""]).await,
        ] {
            assert!(result.is_success());
            assert!(result.normalized_text.is_empty());
            assert!(result.persons.is_empty());
            assert!(result.locations.is_empty());
            assert!(result.topics.is_empty());
            assert!(result.summary.is_empty());
        }
    }

    #[tokio::test]
    async fn test_language_failure_is_reported() {
        let result = DocumentPipeline::new()
            .with_language_pipeline(Arc::new(Broken))
            .process(&AUGUSTO)
            .await;

        assert_eq!(result.status, PipelineStatus::Error);
        assert_eq!(result.error_kind, Some(FailureKind::Language));
        assert!(result
            .error_message
            .as_deref()
            .is_some_and(|m| m.contains("tagger crashed")));
        assert!(result.normalized_text.is_empty());
        assert!(result.persons.is_empty());
        assert!(result.topics.is_empty());
    }

    #[tokio::test]
    async fn test_panic_becomes_task_failure() {
        let result = DocumentPipeline::new()
            .with_language_pipeline(Arc::new(Panicking))
            .process(&["Roma"])
            .await;

        assert_eq!(result.status, PipelineStatus::Error);
        assert_eq!(result.error_kind, Some(FailureKind::Task));
    }

    #[tokio::test]
    async fn test_classification_attached() {
        let tracker = Arc::new(UsageTracker::new());
        let classifier =
            SubjectClassifier::new(Arc::new(Reply(Some("Storia")))).with_usage_tracker(tracker.clone());

        let result = DocumentPipeline::new()
            .with_classifier(classifier)
            .process(&AUGUSTO)
            .await;

        assert!(result.is_success());
        let subject = result.subject.unwrap();
        assert_eq!(subject.subject, "Storia");
        assert_eq!(tracker.snapshot()[0].total_input_tokens, 12);
        assert_eq!(tracker.snapshot()[0].total_output_tokens, 0);
    }

    #[tokio::test]
    async fn test_classification_failure_keeps_success() {
        let result = DocumentPipeline::new()
            .with_classifier(SubjectClassifier::new(Arc::new(Reply(None))))
            .process(&AUGUSTO)
            .await;

        assert!(result.is_success());
        assert!(result.subject.is_none());
        assert!(!result.persons.is_empty());
    }

    #[tokio::test]
    async fn test_process_file_fills_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("augusto.txt");
        std::fs::write(&path, AUGUSTO.join("\x0c")).unwrap();

        let result = DocumentPipeline::new().process_file(&path).await;

        assert!(result.is_success());
        let source = result.source.unwrap();
        assert_eq!(source.source_type, SourceType::Text);
        assert_eq!(source.title.as_deref(), Some("augusto.txt"));
        assert_eq!(source.page_count, Some(2));
        assert_eq!(source.content_hash.map(|h| h.len()), Some(16));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_delete_source_after_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nota.txt");
        std::fs::write(&path, "Cesare attraversò il Rubicone.").unwrap();

        let mut config = PipelineConfig::default();
        config.pipeline.delete_source = true;
        let result = DocumentPipeline::new()
            .with_config(config)
            .process_file(&path)
            .await;

        assert!(result.is_success());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_failed_run_keeps_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nota.txt");
        std::fs::write(&path, "Cesare attraversò il Rubicone.").unwrap();

        let mut config = PipelineConfig::default();
        config.pipeline.delete_source = true;
        let result = DocumentPipeline::new()
            .with_config(config)
            .with_language_pipeline(Arc::new(Broken))
            .process_file(&path)
            .await;

        assert!(!result.is_success());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = DocumentPipeline::new()
            .process_file(&dir.path().join("missing.txt"))
            .await;

        assert_eq!(result.error_kind, Some(FailureKind::Io));
        assert_eq!(
            result.source.and_then(|s| s.title).as_deref(),
            Some("missing.txt")
        );

        let path = dir.path().join("slides.pptx");
        std::fs::write(&path, b"x").unwrap();
        let result = DocumentPipeline::new().process_file(&path).await;
        assert_eq!(result.error_kind, Some(FailureKind::Parse));
    }

    #[tokio::test]
    async fn test_process_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "Dante nacque a Firenze.").unwrap();
        std::fs::write(dir.path().join("b.txt"), b"\xff\xfe\x00").unwrap();
        std::fs::write(dir.path().join("c.jpg"), b"not text").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let batch = DocumentPipeline::new()
            .process_directory(dir.path())
            .await
            .unwrap();

        assert_eq!(batch.success_count(), 1);
        assert_eq!(batch.failure_count(), 1);
        assert_eq!(batch.failed[0].error_kind, Some(FailureKind::Parse));
        assert_eq!(batch.results().count(), 2);
        assert_eq!(batch.total_stats.pages, 1);
    }

    #[test]
    fn test_compute_hash() {
        let hash1 = compute_hash("hello");
        let hash2 = compute_hash("hello");
        let hash3 = compute_hash("world");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 16);
    }

    #[test]
    fn test_result_serializes() {
        let result = PipelineResult::failure(&PipelineError::Io(std::io::Error::other("disk")));
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "error");
        assert_eq!(json["error_kind"], "io");
        assert!(json.get("source").is_none());
    }
}
