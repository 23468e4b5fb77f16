//! Business Logic Services

pub mod agent_profiles;
pub mod agents;
pub mod execution_log;
pub mod graph;
pub mod learning;
pub mod llm;
pub mod orchestrator;
pub mod pricing;
pub mod task_store;

pub use agent_profiles::AgentProfileStore;
pub use agents::{Agent, AgentKind};
pub use execution_log::{ExecutionLog, LogOrder};
pub use graph::{GraphMirror, MemoryGraphMirror, NullGraphMirror};
pub use learning::{FeedbackData, FeedbackKind, LearningSystem};
pub use llm::{AnthropicProvider, LlmProvider};
pub use orchestrator::Orchestrator;
pub use pricing::CostCalculator;
pub use task_store::TaskStore;
