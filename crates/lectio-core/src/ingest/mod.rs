mod extractor;
mod normalizer;
mod parser;
mod pipeline;
mod resolver;

pub use extractor::{clean_name, extract_era_dates, EntityExtractor, ExtractedEntities};
pub use normalizer::{
    basic_cleaning, normalize, normalize_pages, remove_control_chars, smart_line_joining,
};
#[cfg(feature = "pdf")]
pub use parser::PdfParser;
pub use parser::{
    CompositeParser, DocumentFormat, PageExtractor, ParseError, ParseResult, PlainTextParser,
    RawText,
};
pub use pipeline::{
    compute_hash, BatchProcessResult, DocumentPipeline, FailureKind, PipelineError,
    PipelineResult, PipelineStatus, ProcessResult, ProcessStats,
};
pub use resolver::{merge_aliases, ContainmentResolver, EntityCounts};
