//! In-Memory Graph Mirror
//!
//! Process-local adapter backed by RwLock'd maps. Used by tests and by
//! single-process runs that want lineage analytics without an external
//! graph database. Upserts are keyed by the same stable ids a remote
//! adapter would use, so the idempotence contract is identical.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::graph::{
    AgentGraphStats, AgentNode, ExecutionHistoryEntry, ExecutionNode, LearningInsights,
    LearningNode, PatternNode, TaskNode,
};
use crate::utils::error::{AppError, AppResult};

use super::GraphMirror;

#[derive(Debug, Default)]
struct GraphState {
    agents: HashMap<String, AgentNode>,
    tasks: HashMap<String, TaskNode>,
    executions: HashMap<String, ExecutionNode>,
    learnings: HashMap<String, LearningNode>,
    patterns: HashMap<String, PatternNode>,
    /// learning_id -> pattern description (MATCHES relationship)
    learning_patterns: HashMap<String, String>,
}

/// Graph mirror adapter backed by in-process maps
#[derive(Debug, Default)]
pub struct MemoryGraphMirror {
    state: RwLock<GraphState>,
}

impl MemoryGraphMirror {
    /// Create an empty mirror
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<std::sync::RwLockReadGuard<'_, GraphState>> {
        self.state
            .read()
            .map_err(|_| AppError::internal("Graph mirror lock poisoned"))
    }

    fn write(&self) -> AppResult<std::sync::RwLockWriteGuard<'_, GraphState>> {
        self.state
            .write()
            .map_err(|_| AppError::internal("Graph mirror lock poisoned"))
    }

    /// Number of stored nodes, for diagnostics
    pub fn node_counts(&self) -> AppResult<(usize, usize, usize, usize, usize)> {
        let state = self.read()?;
        Ok((
            state.agents.len(),
            state.tasks.len(),
            state.executions.len(),
            state.learnings.len(),
            state.patterns.len(),
        ))
    }
}

impl GraphMirror for MemoryGraphMirror {
    fn upsert_agent(&self, node: &AgentNode) -> AppResult<()> {
        self.write()?
            .agents
            .insert(node.name.clone(), node.clone());
        Ok(())
    }

    fn upsert_task(&self, node: &TaskNode) -> AppResult<()> {
        self.write()?
            .tasks
            .insert(node.task_id.clone(), node.clone());
        Ok(())
    }

    fn record_execution(&self, node: &ExecutionNode) -> AppResult<()> {
        self.write()?
            .executions
            .insert(node.execution_id.clone(), node.clone());
        Ok(())
    }

    fn record_learning(&self, node: &LearningNode) -> AppResult<()> {
        self.write()?
            .learnings
            .insert(node.learning_id.clone(), node.clone());
        Ok(())
    }

    fn upsert_pattern(&self, node: &PatternNode) -> AppResult<()> {
        self.write()?
            .patterns
            .insert(node.description.clone(), node.clone());
        Ok(())
    }

    fn link_learning_to_pattern(
        &self,
        learning_id: &str,
        pattern_description: &str,
    ) -> AppResult<()> {
        self.write()?
            .learning_patterns
            .insert(learning_id.to_string(), pattern_description.to_string());
        Ok(())
    }

    fn find_patterns(&self, pattern_type: &str, limit: usize) -> AppResult<Vec<PatternNode>> {
        let state = self.read()?;
        let mut patterns: Vec<PatternNode> = state
            .patterns
            .values()
            .filter(|p| p.pattern_type == pattern_type)
            .cloned()
            .collect();
        patterns.sort_by(|a, b| b.frequency.cmp(&a.frequency));
        patterns.truncate(limit);
        Ok(patterns)
    }

    fn agent_performance(&self, agent_name: &str) -> AppResult<Option<AgentGraphStats>> {
        let state = self.read()?;
        let executions: Vec<&ExecutionNode> = state
            .executions
            .values()
            .filter(|e| e.agent_name == agent_name)
            .collect();

        if executions.is_empty() {
            return Ok(None);
        }

        let total = executions.len() as i64;
        let quality_sum: f64 = executions.iter().map(|e| e.quality_score).sum();
        Ok(Some(AgentGraphStats {
            agent_name: agent_name.to_string(),
            total_executions: total,
            avg_quality: quality_sum / total as f64,
            total_tokens: executions.iter().map(|e| e.tokens_used).sum(),
            total_cost_microdollars: executions.iter().map(|e| e.cost_microdollars).sum(),
        }))
    }

    fn task_history(&self, task_id: &str) -> AppResult<Vec<ExecutionHistoryEntry>> {
        let state = self.read()?;
        let mut entries: Vec<ExecutionHistoryEntry> = state
            .executions
            .values()
            .filter(|e| e.task_id == task_id)
            .map(|e| {
                let learned_patterns = state
                    .learnings
                    .values()
                    .filter(|l| l.execution_id == e.execution_id)
                    .map(|l| l.pattern_type.clone())
                    .collect();
                ExecutionHistoryEntry {
                    execution_id: e.execution_id.clone(),
                    agent_name: e.agent_name.clone(),
                    status: e.status.clone(),
                    quality_score: e.quality_score,
                    started_at: e.started_at.clone(),
                    learned_patterns,
                }
            })
            .collect();
        entries.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(entries)
    }

    fn learning_insights(&self, agent_name: Option<&str>) -> AppResult<Option<LearningInsights>> {
        let state = self.read()?;

        let learnings: Vec<&LearningNode> = state
            .learnings
            .values()
            .filter(|l| match agent_name {
                Some(name) => state
                    .executions
                    .get(&l.execution_id)
                    .is_some_and(|e| e.agent_name == name),
                None => true,
            })
            .collect();

        if learnings.is_empty() {
            return Ok(None);
        }

        let total = learnings.len() as i64;
        let mut pattern_types: Vec<String> =
            learnings.iter().map(|l| l.pattern_type.clone()).collect();
        pattern_types.sort();
        pattern_types.dedup();

        let unique_patterns = learnings
            .iter()
            .filter_map(|l| state.learning_patterns.get(&l.learning_id))
            .collect::<std::collections::HashSet<_>>()
            .len() as i64;

        Ok(Some(LearningInsights {
            total_learnings: total,
            unique_patterns,
            avg_confidence: learnings.iter().map(|l| l.confidence).sum::<f64>() / total as f64,
            avg_impact: learnings.iter().map(|l| l.impact_score).sum::<f64>() / total as f64,
            pattern_types,
        }))
    }
}
