//! Anthropic Messages API client.
//!
//! See: <https://docs.anthropic.com/en/api/messages>

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::traits::GenerationService;
use crate::types::ModelTier;
use crate::{MimirError, Result};

/// Default base URL for the Anthropic API.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

const API_VERSION: &str = "2023-06-01";

/// Model id served for each tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierModels {
    #[serde(default = "default_fast")]
    pub fast: String,
    #[serde(default = "default_balanced")]
    pub balanced: String,
    #[serde(default = "default_capable")]
    pub capable: String,
}

impl Default for TierModels {
    fn default() -> Self {
        Self {
            fast: default_fast(),
            balanced: default_balanced(),
            capable: default_capable(),
        }
    }
}

fn default_fast() -> String {
    "claude-haiku-4-5".to_string()
}

fn default_balanced() -> String {
    "claude-sonnet-4-5".to_string()
}

fn default_capable() -> String {
    "claude-opus-4-1".to_string()
}

impl TierModels {
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast,
            ModelTier::Balanced => &self.balanced,
            ModelTier::Capable => &self.capable,
        }
    }
}

/// Client for the Anthropic Messages API.
#[derive(Clone)]
pub struct AnthropicService {
    api_key: String,
    http: Client,
    base_url: String,
    models: TierModels,
}

impl AnthropicService {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    ///
    /// The HTTP client carries no request timeout of its own; wrap the
    /// service in a [`TimeoutService`](super::TimeoutService) instead so
    /// that timeouts are classified uniformly.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: Client::new(),
            base_url: base_url.into(),
            models: TierModels::default(),
        }
    }

    /// Override the tier → model mapping.
    pub fn models(mut self, models: TierModels) -> Self {
        self.models = models;
        self
    }

    /// Check response status and map to the appropriate error.
    async fn handle_response_errors(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs);
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.error.message)
            .unwrap_or_else(|_| status.to_string());

        match status.as_u16() {
            401 | 403 => Err(MimirError::AuthenticationFailed),
            400 | 404 | 413 | 422 => Err(MimirError::MalformedRequest(message)),
            408 => Err(MimirError::Timeout(Duration::ZERO)),
            429 => Err(MimirError::RateLimited { retry_after }),
            code => Err(MimirError::Api {
                status: code,
                message,
            }),
        }
    }
}

#[async_trait]
impl GenerationService for AnthropicService {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(
        &self,
        prompt: &str,
        tier: ModelTier,
        max_output_tokens: usize,
    ) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .http
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&MessagesRequest {
                model: self.models.model_for(tier),
                max_tokens: max_output_tokens,
                messages: vec![RequestMessage {
                    role: "user",
                    content: prompt,
                }],
            })
            .send()
            .await
            .map_err(map_transport_error)?;

        let response = Self::handle_response_errors(response).await?;

        let body: MessagesResponse = response.json().await.map_err(map_transport_error)?;

        let text: String = body
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();

        if text.trim().is_empty() {
            return Err(MimirError::EmptyResponse);
        }
        Ok(text)
    }
}

fn map_transport_error(e: reqwest::Error) -> MimirError {
    if e.is_timeout() {
        MimirError::Timeout(Duration::ZERO)
    } else if e.is_decode() {
        MimirError::Api {
            status: 502,
            message: format!("undecodable response: {e}"),
        }
    } else {
        MimirError::Http(e.to_string())
    }
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: usize,
    messages: Vec<RequestMessage<'a>>,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}
