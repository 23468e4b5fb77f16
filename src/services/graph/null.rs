//! Null Graph Mirror
//!
//! No-op adapter injected when the mirror is disabled. Keeps `if mirror`
//! branches out of the business logic: writes succeed silently and reads
//! come back empty.

use crate::models::graph::{
    AgentGraphStats, AgentNode, ExecutionHistoryEntry, ExecutionNode, LearningInsights,
    LearningNode, PatternNode, TaskNode,
};
use crate::utils::error::AppResult;

use super::GraphMirror;

/// Graph mirror that drops all writes and answers all reads with nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGraphMirror;

impl GraphMirror for NullGraphMirror {
    fn upsert_agent(&self, _node: &AgentNode) -> AppResult<()> {
        Ok(())
    }

    fn upsert_task(&self, _node: &TaskNode) -> AppResult<()> {
        Ok(())
    }

    fn record_execution(&self, _node: &ExecutionNode) -> AppResult<()> {
        Ok(())
    }

    fn record_learning(&self, _node: &LearningNode) -> AppResult<()> {
        Ok(())
    }

    fn upsert_pattern(&self, _node: &PatternNode) -> AppResult<()> {
        Ok(())
    }

    fn link_learning_to_pattern(
        &self,
        _learning_id: &str,
        _pattern_description: &str,
    ) -> AppResult<()> {
        Ok(())
    }

    fn find_patterns(&self, _pattern_type: &str, _limit: usize) -> AppResult<Vec<PatternNode>> {
        Ok(Vec::new())
    }

    fn agent_performance(&self, _agent_name: &str) -> AppResult<Option<AgentGraphStats>> {
        Ok(None)
    }

    fn task_history(&self, _task_id: &str) -> AppResult<Vec<ExecutionHistoryEntry>> {
        Ok(Vec::new())
    }

    fn learning_insights(&self, _agent_name: Option<&str>) -> AppResult<Option<LearningInsights>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_mirror_is_silent() {
        let mirror = NullGraphMirror;
        assert!(mirror.find_patterns("quality_pattern", 5).unwrap().is_empty());
        assert!(mirror.agent_performance("content_writer").unwrap().is_none());
        assert!(mirror.task_history("t").unwrap().is_empty());
        assert!(mirror.learning_insights(None).unwrap().is_none());
    }
}
