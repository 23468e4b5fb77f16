//! Graph Mirror Port
//!
//! Optional secondary store for lineage and pattern analytics. All writes
//! are idempotent upserts or appends keyed by stable string ids, so the
//! mirror tolerates races and repeated delivery. Callers treat every
//! operation as best-effort: a mirror failure is logged and swallowed,
//! never escalated into the primary execution path.

pub mod memory;
pub mod null;

use crate::models::graph::{
    AgentGraphStats, AgentNode, ExecutionHistoryEntry, ExecutionNode, LearningInsights,
    LearningNode, PatternNode, TaskNode,
};
use crate::utils::error::AppResult;

pub use memory::MemoryGraphMirror;
pub use null::NullGraphMirror;

/// Port for the best-effort lineage graph
pub trait GraphMirror: Send + Sync {
    /// Create or update an Agent node keyed by agent name
    fn upsert_agent(&self, node: &AgentNode) -> AppResult<()>;

    /// Create or update a Task node keyed by task id
    fn upsert_task(&self, node: &TaskNode) -> AppResult<()>;

    /// Record an Execution node and its EXECUTED/FOR_TASK relationships
    fn record_execution(&self, node: &ExecutionNode) -> AppResult<()>;

    /// Record a Learning node and its GENERATED relationship
    fn record_learning(&self, node: &LearningNode) -> AppResult<()>;

    /// Create or update a Pattern node keyed by description
    fn upsert_pattern(&self, node: &PatternNode) -> AppResult<()>;

    /// Link a Learning node to a Pattern node (MATCHES relationship)
    fn link_learning_to_pattern(&self, learning_id: &str, pattern_description: &str)
        -> AppResult<()>;

    /// Patterns of a given type, most frequent first
    fn find_patterns(&self, pattern_type: &str, limit: usize) -> AppResult<Vec<PatternNode>>;

    /// Aggregates over one agent's recorded executions
    fn agent_performance(&self, agent_name: &str) -> AppResult<Option<AgentGraphStats>>;

    /// Execution history for a task, newest first
    fn task_history(&self, task_id: &str) -> AppResult<Vec<ExecutionHistoryEntry>>;

    /// Learning aggregates, overall or scoped to one agent
    fn learning_insights(&self, agent_name: Option<&str>) -> AppResult<Option<LearningInsights>>;
}
