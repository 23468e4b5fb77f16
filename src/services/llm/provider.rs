//! LLM Provider Trait
//!
//! Defines the common interface the orchestration core consumes. The call
//! may fail with a transient or permanent error; callers treat any failure
//! as task failure — retry policy is an external concern.

use async_trait::async_trait;

use super::types::{CompletionRequest, CompletionResponse, LlmError, LlmResult};

/// Trait that all LLM providers must implement
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Returns the provider name for identification
    fn name(&self) -> &'static str;

    /// Send a single-turn completion request and return the full response
    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse>;
}

/// Helper function to create an error for a missing API key
pub fn missing_api_key_error(provider: &str) -> LlmError {
    LlmError::AuthenticationFailed {
        message: format!("API key not configured for {}", provider),
    }
}

/// Helper function to classify HTTP error status codes
pub fn parse_http_error(status: u16, body: &str, provider: &str) -> LlmError {
    match status {
        401 => LlmError::AuthenticationFailed {
            message: format!("{}: Invalid API key", provider),
        },
        403 => LlmError::AuthenticationFailed {
            message: format!("{}: Access denied", provider),
        },
        404 => LlmError::ModelNotFound {
            model: body.to_string(),
        },
        429 => LlmError::RateLimited {
            message: body.to_string(),
        },
        400 => LlmError::InvalidRequest {
            message: body.to_string(),
        },
        500..=599 => LlmError::ServerError {
            message: body.to_string(),
            status: Some(status),
        },
        _ => LlmError::Other {
            message: format!("HTTP {}: {}", status, body),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_error() {
        let err = missing_api_key_error("anthropic");
        match err {
            LlmError::AuthenticationFailed { message } => {
                assert!(message.contains("anthropic"));
            }
            _ => panic!("Expected AuthenticationFailed"),
        }
    }

    #[test]
    fn test_parse_http_error() {
        let err = parse_http_error(401, "unauthorized", "anthropic");
        assert!(matches!(err, LlmError::AuthenticationFailed { .. }));

        let err = parse_http_error(429, "rate limited", "anthropic");
        assert!(matches!(err, LlmError::RateLimited { .. }));

        let err = parse_http_error(503, "overloaded", "anthropic");
        assert!(matches!(err, LlmError::ServerError { .. }));
    }
}
