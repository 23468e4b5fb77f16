//! Anthropic Claude Provider
//!
//! Implementation of the LlmProvider trait for Anthropic's Messages API.

use async_trait::async_trait;
use serde::Deserialize;

use super::provider::{missing_api_key_error, parse_http_error, LlmProvider};
use super::types::{CompletionRequest, CompletionResponse, LlmError, LlmResult};

/// Default Anthropic API endpoint
const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Current API version
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude provider
pub struct AnthropicProvider {
    api_key: Option<String>,
    base_url: Option<String>,
    client: reqwest::Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            base_url: None,
            client: reqwest::Client::new(),
        }
    }

    /// Override the API base URL (for gateways and tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    fn url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(ANTHROPIC_API_URL)
    }

    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        serde_json::json!({
            "model": request.model,
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
            "system": request.system_prompt,
            "messages": [{
                "role": "user",
                "content": request.user_prompt,
            }],
        })
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| missing_api_key_error("anthropic"))?;

        let body = self.build_request_body(&request);

        let response = self
            .client
            .post(self.url())
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body_text = response.text().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if status != 200 {
            return Err(parse_http_error(status, &body_text, "anthropic"));
        }

        let parsed: MessagesResponse =
            serde_json::from_str(&body_text).map_err(|e| LlmError::ParseError {
                message: format!("Failed to parse response: {}", e),
            })?;

        let text = parsed
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        Ok(CompletionResponse {
            text,
            input_tokens: parsed.usage.input_tokens,
            output_tokens: parsed.usage.output_tokens,
            model: parsed.model,
        })
    }
}

/// Response from the Messages API
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    model: String,
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: i64,
    output_tokens: i64,
}
