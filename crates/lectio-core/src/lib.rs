pub mod classify;
pub mod config;
pub mod entity;
pub mod error;
pub mod ingest;
pub mod language;
pub mod source;
pub mod summary;
pub mod topics;
pub mod usage;

pub use classify::{
    ClassifyError, ClassifyResult, GeminiClient, Generation, SubjectClassification,
    SubjectClassifier, TextGenerator,
};
pub use config::PipelineConfig;
pub use entity::{EntityLabel, EntityType, RankedEntity, RankedEntityList};
pub use error::{Error, Result};
pub use ingest::{
    BatchProcessResult, DocumentPipeline, EntityExtractor, FailureKind, PipelineError,
    PipelineResult, PipelineStatus,
};
pub use language::{default_pipeline, HeuristicItalianPipeline, LanguagePipeline, SharedPipeline};
pub use source::{Source, SourceType};
pub use summary::Summarizer;
pub use topics::{TopicModeler, TopicSet};
pub use usage::{MonthlyUsage, UsageTracker};
