//! Text-generation client for the hosted generative-language API.
//!
//! This crate provides the text-generation collaborator used to produce
//! lifestyle recommendations. It handles:
//! - Building `generateContent` requests for a configured model
//! - Authenticating with an API key header
//! - Mapping transport, HTTP and payload failures to `GenAiError`
//! - Joining the text parts of the first candidate into one string
//!
//! The service gives no structured-output guarantee. Callers receive free
//! text and are expected to extract whatever structure they asked for.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Public endpoint of the generative-language API
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors that can occur when calling the text-generation service
#[derive(Error, Debug)]
pub enum GenAiError {
    #[error("No API key configured for the text-generation service")]
    MissingApiKey,

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Failed to reach text-generation service at {0}")]
    Connection(String),

    #[error("Text-generation request timed out after {0}s")]
    Timeout(u64),

    #[error("Text-generation service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response from text-generation service: {0}")]
    InvalidResponse(String),

    /// The service answered but produced no text (e.g. the prompt was blocked)
    #[error("Text-generation service returned no text: {0}")]
    EmptyResponse(String),
}

/// The text-generation collaborator: one prompt in, free text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenAiError>;
}

/// Connection settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Client for the hosted `generateContent` endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Build a client.
    ///
    /// A missing API key is not an error here; every `generate` call will
    /// fail with [`GenAiError::MissingApiKey`] instead, so the rest of the
    /// application keeps working without recommendations.
    pub fn new(mut config: GeminiConfig) -> Result<Self, GenAiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenAiError::ClientBuild(e.to_string()))?;

        config.base_url = config.base_url.trim_end_matches('/').to_string();
        if config.api_key.as_deref().map_or(true, str::is_empty) {
            error!("Missing API key for the text-generation service; recommendations are disabled");
            config.api_key = None;
        }
        info!(
            "Text-generation client ready (model: {}, endpoint: {})",
            config.model, config.base_url
        );

        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Get the address of the service this client talks to.
    pub fn service_address(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl GenerateResponse {
    /// Text of the first candidate, or why there is none.
    fn into_text(self) -> Result<String, GenAiError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(GenAiError::EmptyResponse(format!("prompt blocked ({})", reason)));
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| GenAiError::EmptyResponse("no candidates".into()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
            return Err(GenAiError::EmptyResponse(format!("finish reason {}", reason)));
        }
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenAiError> {
        let api_key = self.config.api_key.as_deref().ok_or(GenAiError::MissingApiKey)?;

        debug!(
            "Requesting generation from {} ({} prompt chars)",
            self.config.model,
            prompt.len()
        );
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Text-generation request failed: {}", e);
                if e.is_timeout() {
                    GenAiError::Timeout(self.config.timeout_secs)
                } else if e.is_connect() {
                    GenAiError::Connection(self.config.base_url.clone())
                } else {
                    GenAiError::InvalidResponse(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&raw)
                .map(|envelope| envelope.error.message)
                .unwrap_or(raw);
            error!("Text-generation service returned HTTP {}: {}", status, message);
            return Err(GenAiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenAiError::InvalidResponse(e.to_string()))?;

        let text = parsed.into_text()?;
        debug!("Received {} chars of generated text", text.len());
        Ok(text)
    }
}
