//! LLM Types
//!
//! Request/response types and errors for the language-model provider port.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single-turn completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System prompt defining the agent's behaviour
    pub system_prompt: String,
    /// User prompt built from the task data
    pub user_prompt: String,
    /// Model identifier
    pub model: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// A completed model response with token usage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The assistant's text output
    pub text: String,
    /// Input tokens consumed
    pub input_tokens: i64,
    /// Output tokens generated
    pub output_tokens: i64,
    /// Model that actually served the request
    pub model: String,
}

/// Errors from LLM providers
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Rate limited: {message}")]
    RateLimited { message: String },

    #[error("Model not found: {model}")]
    ModelNotFound { model: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Server error (status {status:?}): {message}")]
    ServerError { message: String, status: Option<u16> },

    #[error("Network error: {message}")]
    NetworkError { message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("{message}")]
    Other { message: String },
}

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LlmError::RateLimited {
            message: "try later".to_string(),
        };
        assert_eq!(err.to_string(), "Rate limited: try later");
    }
}
