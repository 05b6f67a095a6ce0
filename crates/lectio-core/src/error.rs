use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid entity label: {0}")]
    InvalidEntityLabel(String),

    #[error("Invalid source type: {0}")]
    InvalidSourceType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Could not read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
