//! LLM backend abstraction
//!
//! Supports Google Gemini (`generateContent`) and OpenAI-compatible APIs.
//! Both are asked for a JSON object and return the model's raw text.

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    },
    Client,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use worldstate_net::{HttpClient, NetError};

/// LLM backend errors
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Empty response")]
    EmptyResponse,

    #[error(transparent)]
    Net(#[from] NetError),
}

/// Generic LLM backend trait
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Generate a completion with system prompt
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError>;

    /// Get the model name
    fn model_name(&self) -> &str;
}

/// Gemini backend configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key, sent as the `key` query parameter
    pub api_key: String,
    /// Model name (e.g., gemini-2.5-flash)
    pub model: String,
    /// API root up to and including the version segment
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Ask for `application/json` output
    pub json_response: bool,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 30,
            json_response: true,
        }
    }
}

impl GeminiConfig {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            ..Default::default()
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    fn first_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .next()?
            .text
    }
}

/// Google Gemini backend
pub struct GeminiBackend {
    client: HttpClient,
    config: GeminiConfig,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig, client: HttpClient) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Config("Gemini API key is empty".to_string()));
        }
        Ok(Self { client, config })
    }

    fn request_body(&self, system: &str, user: &str) -> serde_json::Value {
        let mut body = serde_json::json!({
            "contents": [{
                "parts": [
                    {"text": system},
                    {"text": user}
                ]
            }]
        });

        if self.config.json_response {
            body["generationConfig"] = serde_json::json!({
                "responseMimeType": "application/json"
            });
        }

        body
    }
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let body = self.request_body(system, user);

        let response = self
            .client
            .post_json(
                &self.config.endpoint(),
                &[("key", self.config.api_key.as_str())],
                &body,
                Duration::from_secs(self.config.timeout_secs),
            )
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            warn!("Gemini API error {}: {}", status, text);
            return Err(LlmError::Status { status, body: text });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Net(NetError::Decode(e.to_string())))?;

        let text = parsed.first_text().ok_or(LlmError::EmptyResponse)?;
        debug!("Gemini returned {} chars", text.len());
        Ok(text)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// OpenAI-compatible backend configuration
#[derive(Debug, Clone)]
pub struct OpenAIBackendConfig {
    /// API key
    pub api_key: String,
    /// Base URL (for OpenRouter, local servers, etc.)
    pub base_url: Option<String>,
    /// Model name
    pub model: String,
    /// Temperature (0.0 - 2.0)
    pub temperature: f32,
    /// Max tokens
    pub max_tokens: u16,
    /// Request a JSON object response
    pub json_response: bool,
}

impl Default for OpenAIBackendConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            max_tokens: 256,
            json_response: true,
        }
    }
}

impl OpenAIBackendConfig {
    pub fn openai(api_key: &str, model: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            ..Default::default()
        }
    }

    pub fn local(base_url: &str, model: &str) -> Self {
        Self {
            api_key: "sk-local".to_string(),
            base_url: Some(base_url.to_string()),
            model: model.to_string(),
            ..Default::default()
        }
    }
}

/// OpenAI-compatible LLM backend
pub struct OpenAIBackend {
    client: Client<OpenAIConfig>,
    config: OpenAIBackendConfig,
}

impl OpenAIBackend {
    pub fn new(config: OpenAIBackendConfig, http: &HttpClient) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Config("OpenAI API key is empty".to_string()));
        }

        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(base_url) = &config.base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        let client =
            Client::with_config(openai_config).with_http_client(http.reqwest_client().clone());

        Ok(Self { client, config })
    }
}

#[async_trait]
impl LlmBackend for OpenAIBackend {
    async fn generate(&self, system: &str, user: &str) -> Result<String, LlmError> {
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()
                    .map_err(|e| LlmError::Api(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(user)
                    .build()
                    .map_err(|e| LlmError::Api(e.to_string()))?,
            ),
        ];

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.config.model)
            .messages(messages)
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens);

        if self.config.json_response {
            args.response_format(ResponseFormat::JsonObject);
        }

        let request = args.build().map_err(|e| LlmError::Api(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .ok_or(LlmError::EmptyResponse)
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

/// Thread-safe reference to an LLM backend
pub type SharedBackend = Arc<dyn LlmBackend>;

/// Create a shared Gemini backend
pub fn create_gemini_backend(
    config: GeminiConfig,
    client: HttpClient,
) -> Result<SharedBackend, LlmError> {
    Ok(Arc::new(GeminiBackend::new(config, client)?))
}

/// Create a shared OpenAI-compatible backend
pub fn create_openai_backend(
    config: OpenAIBackendConfig,
    client: &HttpClient,
) -> Result<SharedBackend, LlmError> {
    Ok(Arc::new(OpenAIBackend::new(config, client)?))
}
