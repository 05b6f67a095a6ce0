use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{ClassifyError, ClassifyResult, Generation, TextGenerator};
use crate::config::ClassifierConfig;

const SERVICE_NAME: &str = "gemini";
const RESPONSE_MIME_TYPE: &str = "text/plain";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

impl From<&ClassifierConfig> for GenerationConfig {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
            response_mime_type: RESPONSE_MIME_TYPE.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    pub prompt_token_count: Option<u64>,
    pub candidates_token_count: Option<u64>,
    pub total_token_count: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, parts concatenated.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content.parts.iter().map(|p| p.text.as_str()).collect();
        (!text.trim().is_empty()).then_some(text)
    }

    pub fn into_generation(self) -> ClassifyResult<Generation> {
        let text = self
            .text()
            .ok_or_else(|| ClassifyError::EmptyResponse(SERVICE_NAME.into()))?;
        let usage = self.usage_metadata;

        Ok(Generation {
            text,
            input_tokens: usage.as_ref().and_then(|u| u.prompt_token_count),
            output_tokens: usage.as_ref().and_then(|u| u.candidates_token_count),
        })
    }
}

/// Google Generative Language `generateContent` over HTTPS.
pub struct GeminiClient {
    http: Client,
    endpoint: Url,
    model: String,
    api_key: String,
    generation: GenerationConfig,
}

impl GeminiClient {
    pub fn new(config: &ClassifierConfig, api_key: String) -> ClassifyResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("lectio/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint: Url::parse(&config.endpoint)?,
            model: config.model.clone(),
            api_key,
            generation: GenerationConfig::from(config),
        })
    }

    /// Read the API key from the environment variable named in `config`.
    pub fn from_config(config: &ClassifierConfig) -> ClassifyResult<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ClassifyError::MissingApiKey(config.api_key_env.clone()))?;

        Self::new(config, api_key)
    }

    pub fn request_url(&self) -> ClassifyResult<Url> {
        let base = self.endpoint.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/{}:generateContent", self.model))?;
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    #[must_use]
    pub fn request_body(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: self.generation.clone(),
        }
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiClient {
    fn service_name(&self) -> &str {
        SERVICE_NAME
    }

    async fn generate(&self, prompt: &str) -> ClassifyResult<Generation> {
        let response = self
            .http
            .post(self.request_url()?)
            .json(&self.request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifyError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let generation = response
            .json::<GenerateContentResponse>()
            .await?
            .into_generation()?;

        tracing::info!(
            model = %self.model,
            input_tokens = ?generation.input_tokens,
            output_tokens = ?generation.output_tokens,
            "Generated response"
        );

        Ok(generation)
    }
}
