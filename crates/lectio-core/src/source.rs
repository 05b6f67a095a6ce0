use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Pdf,
    Text,
}

impl SourceType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Text => "text",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(Self::Pdf),
            "text" => Ok(Self::Text),
            _ => Err(crate::Error::InvalidSourceType(s.to_string())),
        }
    }
}

/// Where the text of a pipeline run came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    pub id: Uuid,
    pub source_type: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl Source {
    #[must_use]
    pub fn new(source_type: SourceType) -> Self {
        Self {
            id: Uuid::now_v7(),
            source_type,
            title: None,
            uri: None,
            content_hash: None,
            page_count: None,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn file(source_type: SourceType, title: String, uri: String) -> Self {
        Self {
            title: Some(title),
            uri: Some(uri),
            ..Self::new(source_type)
        }
    }

    #[must_use]
    pub fn with_hash(mut self, hash: String) -> Self {
        self.content_hash = Some(hash);
        self
    }

    #[must_use]
    pub fn with_page_count(mut self, count: u32) -> Self {
        self.page_count = Some(count);
        self
    }
}
