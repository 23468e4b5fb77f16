//! Graph Mirror Integration Tests
//!
//! The mirror is a best-effort sink: with the in-memory adapter it records
//! lineage and feeds task insights; with the null adapter the engine runs
//! identically in core-only mode.

use calor_strategy::models::graph::AgentNode;
use calor_strategy::services::graph::GraphMirror;
use calor_strategy::{MemoryGraphMirror, Task, TaskCategory, TriggerSource};

use crate::support::{engine, engine_with_mirror, MockProvider};

#[tokio::test]
async fn test_successful_execution_is_mirrored() {
    let (_db, orchestrator, mirror) = engine_with_mirror(MockProvider::succeeding());
    let store = orchestrator.task_store().clone();

    let task = Task::new("Blog o fotovoltaice", TaskCategory::Content, 1)
        .with_agent("content_writer");
    store.create(&task).unwrap();

    orchestrator.execute_batch(1).await.unwrap();

    // Agent (seeded at startup), task and execution nodes exist
    let (agents, tasks, executions, learnings, patterns) = mirror.node_counts().unwrap();
    assert_eq!(agents, 4);
    assert_eq!(tasks, 1);
    assert_eq!(executions, 1);
    // A learning event and its pattern were recorded from the success
    assert_eq!(learnings, 1);
    assert_eq!(patterns, 1);

    let stats = mirror.agent_performance("content_writer").unwrap().unwrap();
    assert_eq!(stats.total_executions, 1);
    assert!(stats.total_tokens > 0);
}

#[tokio::test]
async fn test_task_insights_reflect_history() {
    let (_db, orchestrator, _mirror) = engine_with_mirror(MockProvider::succeeding());
    let store = orchestrator.task_store().clone();

    let task = Task::new("Kampaň jaro", TaskCategory::Marketing, 1).with_agent("marketing_copy");
    store.create(&task).unwrap();

    orchestrator
        .execute_task(&task, TriggerSource::Workflow)
        .await
        .unwrap();

    let insights = orchestrator.get_task_insights(&task.id);
    assert_eq!(insights.execution_count, 1);
    assert!((insights.avg_quality - 0.9).abs() < f64::EPSILON);
    assert_eq!(insights.learned_patterns, vec!["quality_pattern".to_string()]);
}

#[tokio::test]
async fn test_failed_execution_is_not_mirrored() {
    let (_db, orchestrator, mirror) = engine_with_mirror(MockProvider::failing("down"));
    let store = orchestrator.task_store().clone();

    let task = Task::new("t", TaskCategory::Content, 1).with_agent("content_writer");
    store.create(&task).unwrap();

    orchestrator.execute_batch(1).await.unwrap();

    let (_, _, executions, learnings, _) = mirror.node_counts().unwrap();
    assert_eq!(executions, 0);
    assert_eq!(learnings, 0);
}

#[tokio::test]
async fn test_core_only_mode_with_null_mirror() {
    // Identical flow with the mirror disabled: primary semantics unchanged
    let (_db, orchestrator) = engine(MockProvider::succeeding());
    let store = orchestrator.task_store().clone();

    let task = Task::new("t", TaskCategory::Content, 1).with_agent("content_writer");
    store.create(&task).unwrap();

    let batch = orchestrator.execute_batch(1).await.unwrap();
    assert_eq!(batch.succeeded, 1);

    let insights = orchestrator.get_task_insights(&task.id);
    assert_eq!(insights.execution_count, 0);
    assert!(insights.learned_patterns.is_empty());

    let report = orchestrator.get_status_report().unwrap();
    assert!(report.graph_insights.is_empty());
}

#[test]
fn test_upsert_same_key_twice_keeps_one_node_with_latest_values() {
    let mirror = MemoryGraphMirror::new();
    let node = AgentNode {
        name: "content_writer".to_string(),
        agent_type: "content".to_string(),
        active: true,
        tasks_completed: 1,
        avg_quality_score: 0.5,
        success_rate: 0.5,
    };
    mirror.upsert_agent(&node).unwrap();
    mirror
        .upsert_agent(&AgentNode {
            tasks_completed: 7,
            avg_quality_score: 0.92,
            ..node
        })
        .unwrap();

    let (agents, _, _, _, _) = mirror.node_counts().unwrap();
    assert_eq!(agents, 1);
}
