//! Reporting Models
//!
//! Aggregated results returned by the orchestrator: batch outcomes, the
//! overall status report and per-task insights.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::execution::ExecutionResult;
use crate::models::graph::{AgentGraphStats, ExecutionHistoryEntry};

/// Outcome of one batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    /// Number of tasks attempted
    pub total: usize,
    /// Attempts that produced reviewable output
    pub succeeded: usize,
    /// Attempts that failed (gating or model failure)
    pub failed: usize,
    /// Individual results, in execution order
    pub results: Vec<ExecutionResult>,
}

impl BatchResult {
    /// An empty batch (no eligible tasks)
    pub fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            results: Vec::new(),
        }
    }

    /// Total cost of the batch in microdollars
    pub fn total_cost_microdollars(&self) -> i64 {
        self.results.iter().map(|r| r.cost_microdollars).sum()
    }
}

/// Per-agent performance snapshot combining stored profile stats with
/// execution-log aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentPerformance {
    pub agent_name: String,
    /// From the stored profile (maintained by the approval workflow)
    pub tasks_completed: i64,
    pub avg_quality_score: Option<f64>,
    pub success_rate: Option<f64>,
    /// From the execution log
    pub executions: i64,
    pub successful_executions: i64,
    pub total_tokens: i64,
    pub total_cost_microdollars: i64,
}

/// Overall orchestration status report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    /// When the report was generated (RFC 3339)
    pub generated_at: String,
    /// Task counts keyed by status string
    pub status_breakdown: HashMap<String, i64>,
    /// Per-agent performance snapshots
    pub agent_performance: Vec<AgentPerformance>,
    /// Total number of tasks
    pub total_tasks: i64,
    /// done / total, 0 when there are no tasks
    pub completion_rate: f64,
    /// Best-effort per-agent aggregates from the graph mirror
    pub graph_insights: HashMap<String, AgentGraphStats>,
    /// Best-effort learning report from the mirror
    pub learning: Option<LearningReport>,
}

/// Learning insights for one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentLearning {
    pub agent_name: String,
    pub total_learnings: i64,
    pub unique_patterns: i64,
    pub avg_confidence: f64,
    pub avg_impact: f64,
    pub pattern_types: Vec<String>,
    /// "no_learning" | "slow" | "moderate" | "fast"
    pub learning_velocity: String,
}

/// System-wide learning report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningReport {
    pub generated_at: String,
    pub total_learnings: i64,
    pub total_patterns: i64,
    /// "nascent" | "developing" | "maturing" | "mature"
    pub system_maturity: String,
    pub agents: Vec<AgentLearning>,
}

/// Lineage insights for a single task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskInsights {
    pub task_id: String,
    pub execution_count: usize,
    pub executions: Vec<ExecutionHistoryEntry>,
    /// Average quality across recorded executions, 0 when none exist
    pub avg_quality: f64,
    /// Distinct pattern types learned from this task's executions
    pub learned_patterns: Vec<String>,
}

/// A recommendation derived from learned patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub pattern: String,
    pub success_rate: f64,
    pub frequency: i64,
    pub advice: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::execution::ExecutionResult;

    #[test]
    fn test_batch_cost_sums_results() {
        let mut batch = BatchResult::empty();
        let mut a = ExecutionResult::rejected("t1", "x");
        a.cost_microdollars = 1_500;
        let mut b = ExecutionResult::rejected("t2", "y");
        b.cost_microdollars = 2_500;
        batch.results = vec![a, b];
        assert_eq!(batch.total_cost_microdollars(), 4_000);
    }
}
