//! LLM Provider Port
//!
//! The language-model collaborator behind a narrow trait: prompt in,
//! completion plus token usage out.

pub mod anthropic;
pub mod provider;
pub mod types;

pub use anthropic::AnthropicProvider;
pub use provider::LlmProvider;
pub use types::{CompletionRequest, CompletionResponse, LlmError, LlmResult};
