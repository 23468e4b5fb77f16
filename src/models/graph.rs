//! Graph Mirror Models
//!
//! Node and query-result types for the best-effort lineage graph:
//! Agent -[:EXECUTED]-> Execution -[:FOR_TASK]-> Task, and
//! Execution -[:GENERATED]-> Learning -[:MATCHES]-> Pattern.
//!
//! Nodes are keyed by stable string ids so writes can be idempotent upserts.

use serde::{Deserialize, Serialize};

/// Agent node, keyed by agent name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentNode {
    /// Stable key: the agent name
    pub name: String,
    /// Content domain the agent covers
    pub agent_type: String,
    /// Whether the agent is dispatchable
    pub active: bool,
    /// Number of completed tasks
    pub tasks_completed: i64,
    /// Rolling average quality score
    pub avg_quality_score: f64,
    /// Rolling success rate
    pub success_rate: f64,
}

/// Task node, keyed by task id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskNode {
    /// Stable key: the task id
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: i32,
    pub category: String,
    pub tags: Vec<String>,
    pub created_at: String,
}

/// Execution node, keyed by execution id; carries its relationships
/// (agent name, task id) as fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionNode {
    /// Stable key: the execution id
    pub execution_id: String,
    /// EXECUTED relationship source
    pub agent_name: String,
    /// FOR_TASK relationship target
    pub task_id: String,
    pub status: String,
    pub quality_score: f64,
    pub tokens_used: i64,
    pub cost_microdollars: i64,
    pub model_used: String,
    pub trigger_source: String,
    pub started_at: String,
}

/// Learning node derived from one execution's feedback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningNode {
    /// Stable key: the learning id
    pub learning_id: String,
    /// GENERATED relationship source
    pub execution_id: String,
    /// Pattern type tag (e.g. "quality_pattern")
    pub pattern_type: String,
    /// Serialized feedback payload
    pub feedback: serde_json::Value,
    /// Confidence in the feedback, in [0, 1]
    pub confidence: f64,
    /// Impact score, in [0, 1]
    pub impact_score: f64,
}

/// Aggregated pattern node, keyed by description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternNode {
    /// Stable key: the pattern description
    pub description: String,
    /// Pattern type tag
    pub pattern_type: String,
    /// How many learnings matched this pattern
    pub frequency: i64,
    /// Running success rate in [0, 1]
    pub success_rate: f64,
}

/// Per-agent aggregates computed from the lineage graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentGraphStats {
    pub agent_name: String,
    pub total_executions: i64,
    pub avg_quality: f64,
    pub total_tokens: i64,
    pub total_cost_microdollars: i64,
}

/// One entry of a task's execution history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionHistoryEntry {
    pub execution_id: String,
    pub agent_name: String,
    pub status: String,
    pub quality_score: f64,
    pub started_at: String,
    /// Pattern types of learnings generated by this execution
    pub learned_patterns: Vec<String>,
}

/// Aggregated learning insights, overall or per agent
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LearningInsights {
    pub total_learnings: i64,
    pub unique_patterns: i64,
    pub avg_confidence: f64,
    pub avg_impact: f64,
    pub pattern_types: Vec<String>,
}
