use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Fixed assistant preamble prepended to every forwarded message.
const PREAMBLE: &str = "You are an AI assistant specialized in helping with \
programming and technical questions. Please provide a detailed and helpful \
response to this question: ";

const MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Client for the generative-AI provider.
///
/// This trait allows mocking the provider in tests.
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    /// Generate a reply for a single free-text message.
    async fn generate(&self, message: &str) -> Result<String, ChatError>;
}

#[derive(Debug, Serialize, Deserialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1024,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    message: String,
}

/// Gemini implementation of the GenerativeClient.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    /// Point the client at a different endpoint (used by tests).
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    fn request_body(message: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: format!("{PREAMBLE}{message}"),
                }],
            }],
            generation_config: GenerationConfig::default(),
        }
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, message: &str) -> Result<String, ChatError> {
        let url = format!(
            "{}/v1beta/models/{MODEL}:generateContent?key={}",
            self.base_url, self.api_key
        );

        let response = self
            .http
            .post(&url)
            .json(&Self::request_body(message))
            .send()
            .await
            .map_err(|e| ChatError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            // Providers answer errors with `{error: {message, ...}}`; fall
            // back to the raw body when the shape differs.
            let raw = response
                .text()
                .await
                .map_err(|e| ChatError::Upstream(e.to_string()))?;
            let message = serde_json::from_str::<ProviderErrorEnvelope>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(ChatError::classify(message));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Upstream(e.to_string()))?;

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ChatError::Upstream(
                "Provider returned an empty response".to_string(),
            ));
        }

        Ok(text)
    }
}
