use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::source::SourceType;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Encoding error: {0}")]
    Encoding(String),
    #[error("Parse failed: {0}")]
    ParseFailed(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

const PAGE_BREAK: char = '\u{0C}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Markdown,
    Pdf,
}

impl DocumentFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "text" => Some(Self::PlainText),
            "md" | "markdown" => Some(Self::Markdown),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "text/plain" => Some(Self::PlainText),
            "text/markdown" => Some(Self::Markdown),
            "application/pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    #[must_use]
    pub fn source_type(&self) -> SourceType {
        match self {
            Self::Pdf => SourceType::Pdf,
            Self::PlainText | Self::Markdown => SourceType::Text,
        }
    }
}

/// Per-page text as it comes out of an extractor, before normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawText {
    pub format: DocumentFormat,
    pub title: Option<String>,
    pub pages: Vec<String>,
}

impl RawText {
    #[must_use]
    pub fn new(format: DocumentFormat, pages: Vec<String>) -> Self {
        Self {
            format,
            title: None,
            pages,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: String) -> Self {
        self.title = Some(title);
        self
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.chars().count()).sum()
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.pages.iter().all(|p| p.trim().is_empty())
    }
}

/// Turns document bytes into per-page text.
#[async_trait::async_trait]
pub trait PageExtractor: Send + Sync {
    fn supported_formats(&self) -> &[DocumentFormat];

    fn can_parse(&self, format: DocumentFormat) -> bool {
        self.supported_formats().contains(&format)
    }

    async fn extract_bytes(&self, data: &[u8], format: DocumentFormat) -> ParseResult<RawText>;

    async fn extract_file(&self, path: &Path) -> ParseResult<RawText> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| ParseError::UnsupportedFormat("no extension".into()))?;

        let format = DocumentFormat::from_extension(ext)
            .ok_or_else(|| ParseError::UnsupportedFormat(ext.into()))?;

        if !self.can_parse(format) {
            return Err(ParseError::UnsupportedFormat(format!("{format:?}")));
        }

        let data = tokio::fs::read(path).await?;
        let raw = self.extract_bytes(&data, format).await?;

        Ok(match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => raw.with_title(name.to_string()),
            None => raw,
        })
    }
}

/// UTF-8 text; form feeds separate pages.
pub struct PlainTextParser;

impl PlainTextParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for PlainTextParser {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PageExtractor for PlainTextParser {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::PlainText, DocumentFormat::Markdown]
    }

    async fn extract_bytes(&self, data: &[u8], format: DocumentFormat) -> ParseResult<RawText> {
        let text =
            std::str::from_utf8(data).map_err(|e| ParseError::Encoding(e.to_string()))?;

        let pages = text.split(PAGE_BREAK).map(str::to_string).collect();
        Ok(RawText::new(format, pages))
    }
}

#[cfg(feature = "pdf")]
pub struct PdfParser;

#[cfg(feature = "pdf")]
impl PdfParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn pages(data: &[u8]) -> ParseResult<Vec<String>> {
        let document =
            lopdf::Document::load_mem(data).map_err(|e| ParseError::ParseFailed(e.to_string()))?;

        let pages = document
            .get_pages()
            .into_keys()
            .map(|number| match document.extract_text(&[number]) {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(page = number, error = %e, "Skipping unreadable PDF page");
                    String::new()
                }
            })
            .collect();

        Ok(pages)
    }
}

#[cfg(feature = "pdf")]
impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "pdf")]
#[async_trait::async_trait]
impl PageExtractor for PdfParser {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Pdf]
    }

    async fn extract_bytes(&self, data: &[u8], _format: DocumentFormat) -> ParseResult<RawText> {
        let data = data.to_vec();
        let pages = tokio::task::spawn_blocking(move || Self::pages(&data))
            .await
            .map_err(|e| ParseError::ParseFailed(e.to_string()))??;

        Ok(RawText::new(DocumentFormat::Pdf, pages))
    }
}

pub struct CompositeParser {
    parsers: Vec<Box<dyn PageExtractor>>,
}

impl CompositeParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn PageExtractor>) -> Self {
        self.parsers.push(parser);
        self
    }

    pub fn add_parser(&mut self, parser: Box<dyn PageExtractor>) {
        self.parsers.push(parser);
    }

    fn find_parser(&self, format: DocumentFormat) -> Option<&dyn PageExtractor> {
        self.parsers
            .iter()
            .find(|p| p.can_parse(format))
            .map(AsRef::as_ref)
    }
}

impl Default for CompositeParser {
    fn default() -> Self {
        let parser = Self::new().with_parser(Box::new(PlainTextParser::new()));
        #[cfg(feature = "pdf")]
        let parser = parser.with_parser(Box::new(PdfParser::new()));
        parser
    }
}

#[async_trait::async_trait]
impl PageExtractor for CompositeParser {
    fn supported_formats(&self) -> &[DocumentFormat] {
        &[
            DocumentFormat::PlainText,
            DocumentFormat::Markdown,
            DocumentFormat::Pdf,
        ]
    }

    fn can_parse(&self, format: DocumentFormat) -> bool {
        self.find_parser(format).is_some()
    }

    async fn extract_bytes(&self, data: &[u8], format: DocumentFormat) -> ParseResult<RawText> {
        let parser = self
            .find_parser(format)
            .ok_or_else(|| ParseError::UnsupportedFormat(format!("{format:?}")))?;

        parser.extract_bytes(data, format).await
    }
}
