//! Shared test fixtures: scripted model provider and engine wiring.

use std::sync::Arc;

use async_trait::async_trait;

use calor_strategy::services::graph::GraphMirror;
use calor_strategy::services::llm::{
    CompletionRequest, CompletionResponse, LlmError, LlmProvider, LlmResult,
};
use calor_strategy::storage::Database;
use calor_strategy::{MemoryGraphMirror, NullGraphMirror, Orchestrator};

/// What the mock provider does on every call
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Return this text with the given token usage
    Succeed {
        text: String,
        input_tokens: i64,
        output_tokens: i64,
    },
    /// Fail with a server error carrying this message
    Fail(String),
}

/// Scripted in-process model provider
pub struct MockProvider {
    behavior: MockBehavior,
}

impl MockProvider {
    /// A provider that always returns well-formed JSON output
    pub fn succeeding() -> Self {
        Self {
            behavior: MockBehavior::Succeed {
                text: r#"{"title": "Tepelná čerpadla pro rodinné domy", "quality_score": 0.9}"#
                    .to_string(),
                input_tokens: 1200,
                output_tokens: 800,
            },
        }
    }

    /// A provider with explicit behavior
    pub fn with_behavior(behavior: MockBehavior) -> Self {
        Self { behavior }
    }

    /// A provider that always fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            behavior: MockBehavior::Fail(message.into()),
        }
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> LlmResult<CompletionResponse> {
        match &self.behavior {
            MockBehavior::Succeed {
                text,
                input_tokens,
                output_tokens,
            } => Ok(CompletionResponse {
                text: text.clone(),
                input_tokens: *input_tokens,
                output_tokens: *output_tokens,
                model: request.model,
            }),
            MockBehavior::Fail(message) => Err(LlmError::ServerError {
                message: message.clone(),
                status: Some(529),
            }),
        }
    }
}

/// In-memory engine with the null mirror
pub fn engine(provider: MockProvider) -> (Database, Orchestrator) {
    let db = Database::new_in_memory().unwrap();
    let orchestrator = Orchestrator::new(&db, Arc::new(provider), Arc::new(NullGraphMirror))
        .expect("orchestrator should build from seeded profiles");
    (db, orchestrator)
}

/// In-memory engine with a shared in-memory mirror
pub fn engine_with_mirror(provider: MockProvider) -> (Database, Orchestrator, Arc<MemoryGraphMirror>) {
    let db = Database::new_in_memory().unwrap();
    let mirror = Arc::new(MemoryGraphMirror::new());
    let orchestrator = Orchestrator::new(
        &db,
        Arc::new(provider),
        Arc::clone(&mirror) as Arc<dyn GraphMirror>,
    )
    .expect("orchestrator should build from seeded profiles");
    (db, orchestrator, mirror)
}
