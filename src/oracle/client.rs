//! OpenAI-compatible chat-completions client
//!
//! Low-level HTTP client for the oracle endpoint. Sends one system + one user
//! message per call with JSON response format enabled and returns the raw
//! message content; response-shape validation belongs to the stage parsers.

use crate::errors::{PipelineError, Result};
use crate::oracle::{Oracle, OracleRequest};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

/// Default oracle endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Chat-completions client for the classification/generation oracle
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Create a client with a bounded request timeout
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PipelineError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Current model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Oracle for OpenAiClient {
    async fn complete(&self, request: &OracleRequest) -> Result<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user }
            ],
            "response_format": { "type": "json_object" },
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(PipelineError::HttpError)?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    PipelineError::CredentialError(format!("HTTP {}: {}", status, text))
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    PipelineError::RateLimited(format!("HTTP {}: {}", status, text))
                }
                _ => PipelineError::OracleApiError(format!("HTTP {}: {}", status, text)),
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::MalformedResponse(format!("invalid envelope: {}", e)))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| PipelineError::MalformedResponse("response has no choices".to_string()))
    }
}

/// Chat-completions response envelope
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}
