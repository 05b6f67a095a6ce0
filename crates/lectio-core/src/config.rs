//! Pipeline configuration.
//!
//! Lives at `<config dir>/lectio/lectio.toml`. Environment variables override
//! the file, and CLI flags override both.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "lectio";
const CONFIG_FILE_NAME: &str = "lectio.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub topics: TopicsConfig,

    #[serde(default)]
    pub entities: EntitiesConfig,

    #[serde(default)]
    pub summary: SummaryConfig,

    #[serde(default)]
    pub pipeline: RunConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,
}

/// `[topics]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicsConfig {
    #[serde(default = "default_num_topics")]
    pub num_topics: usize,

    /// Terms per topic descriptor.
    #[serde(default = "default_num_words")]
    pub num_words: usize,

    #[serde(default = "default_passes")]
    pub passes: usize,

    /// Gibbs sweeps per pass.
    #[serde(default = "default_iterations")]
    pub iterations: usize,

    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for TopicsConfig {
    fn default() -> Self {
        Self {
            num_topics: default_num_topics(),
            num_words: default_num_words(),
            passes: default_passes(),
            iterations: default_iterations(),
            seed: default_seed(),
        }
    }
}

fn default_num_topics() -> usize {
    1
}
fn default_num_words() -> usize {
    6
}
fn default_passes() -> usize {
    15
}
fn default_iterations() -> usize {
    50
}
fn default_seed() -> u64 {
    42
}

/// `[entities]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitiesConfig {
    /// Entities per category handed to prompts and CLI listings.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for EntitiesConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
        }
    }
}

fn default_top_n() -> usize {
    5
}

/// `[summary]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "default_summary_sentences")]
    pub sentences: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            sentences: default_summary_sentences(),
        }
    }
}

fn default_summary_sentences() -> usize {
    crate::summary::DEFAULT_SENTENCES
}

/// `[pipeline]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_page_separator")]
    pub page_separator: String,

    /// Remove the input file after a successful run.
    #[serde(default)]
    pub delete_source: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            page_separator: default_page_separator(),
            delete_source: false,
        }
    }
}

fn default_page_separator() -> String {
    "\n".into()
}

/// `[classifier]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: default_model(),
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            top_k: default_top_k(),
            max_output_tokens: default_max_output_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

fn default_model() -> String {
    "models/gemini-1.5-flash".into()
}
fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}
fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_temperature() -> f32 {
    1.0
}
fn default_top_p() -> f32 {
    0.95
}
fn default_top_k() -> u32 {
    40
}
fn default_max_output_tokens() -> u32 {
    8192
}
fn default_timeout_seconds() -> u64 {
    60
}

impl PipelineConfig {
    /// Load from `path`, or from the default location when `path` is `None`.
    /// A missing default file yields defaults; a missing explicit file is an
    /// error. Environment overrides are applied and the result validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::load_from(&path)?,
                _ => {
                    tracing::debug!("config file not found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(toml::from_str(&content)?)
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply `LECTIO_*` overrides, reading variables through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LECTIO_NUM_TOPICS") {
            self.topics.num_topics = parse_var("LECTIO_NUM_TOPICS", &v)?;
        }
        if let Some(v) = lookup("LECTIO_NUM_WORDS") {
            self.topics.num_words = parse_var("LECTIO_NUM_WORDS", &v)?;
        }
        if let Some(v) = lookup("LECTIO_SEED") {
            self.topics.seed = parse_var("LECTIO_SEED", &v)?;
        }
        if let Some(v) = lookup("LECTIO_TOP_N") {
            self.entities.top_n = parse_var("LECTIO_TOP_N", &v)?;
        }
        if let Some(v) = lookup("LECTIO_DELETE_SOURCE") {
            self.pipeline.delete_source = v == "1" || v.eq_ignore_ascii_case("true");
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.topics.num_topics == 0 {
            return Err(Error::InvalidConfig("num_topics must be at least 1".into()));
        }
        if self.topics.num_words == 0 {
            return Err(Error::InvalidConfig("num_words must be at least 1".into()));
        }
        if self.topics.passes == 0 {
            return Err(Error::InvalidConfig("passes must be at least 1".into()));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// `<config dir>/lectio/lectio.toml`, if the platform has a config dir.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("{name}: invalid value {value:?}")))
}
