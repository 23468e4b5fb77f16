//! Orchestrator Integration Tests
//!
//! State-machine transitions, dependency gating, batch ordering and
//! reporting, driven end-to-end through `execute_task`/`execute_batch`
//! against an in-memory database and a scripted model provider.

use calor_strategy::services::execution_log::LogOrder;
use calor_strategy::{ExecutionStatus, Task, TaskCategory, TaskChanges, TaskStatus, TriggerSource};

use crate::support::{engine, MockBehavior, MockProvider};

// ============================================================================
// End-to-End: Success Path
// ============================================================================

#[tokio::test]
async fn test_batch_success_moves_task_to_review() {
    let (_db, orchestrator) = engine(MockProvider::succeeding());
    let store = orchestrator.task_store().clone();

    let task = Task::new("Landing page copy", TaskCategory::Content, 1).with_agent("content_writer");
    store.create(&task).unwrap();

    let before = orchestrator.get_status_report().unwrap();
    assert_eq!(before.status_breakdown.get("review"), None);

    let batch = orchestrator.execute_batch(1).await.unwrap();
    assert_eq!(batch.total, 1);
    assert_eq!(batch.succeeded, 1);
    assert_eq!(batch.failed, 0);

    // backlog -> in_progress -> review
    let loaded = store.get(&task.id).unwrap().unwrap();
    assert_eq!(loaded.status, TaskStatus::Review);
    assert_eq!(loaded.progress, 80);
    assert!((loaded.quality_score.unwrap() - 0.9).abs() < f64::EPSILON);
    assert!(loaded.started_at.is_some());
    assert_eq!(loaded.output_data.unwrap()["title"], "Tepelná čerpadla pro rodinné domy");

    // Exactly one execution record, successful
    let records = orchestrator
        .execution_log()
        .for_task(&task.id, LogOrder::OldestFirst)
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, ExecutionStatus::Success);
    assert!(records[0].input_prompt.as_deref().unwrap().contains("Landing page copy"));

    // review count incremented by one
    let after = orchestrator.get_status_report().unwrap();
    assert_eq!(after.status_breakdown.get("review"), Some(&1));
}

#[tokio::test]
async fn test_unparseable_output_still_reaches_review_with_fallback_score() {
    let (_db, orchestrator) = engine(MockProvider::with_behavior(MockBehavior::Succeed {
        text: "Bohužel nemohu vrátit JSON, zde je prostý text.".to_string(),
        input_tokens: 100,
        output_tokens: 50,
    }));
    let store = orchestrator.task_store().clone();

    let task = Task::new("Meta tags", TaskCategory::Seo, 1).with_agent("seo_specialist");
    store.create(&task).unwrap();

    let result = orchestrator
        .execute_task(&task, TriggerSource::Manual)
        .await
        .unwrap();
    assert!(result.success, "parse failure is a degraded success, not an error");

    let loaded = store.get(&task.id).unwrap().unwrap();
    assert_eq!(loaded.status, TaskStatus::Review);
    assert!((loaded.quality_score.unwrap() - 0.6).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_reported_cost_is_exact_for_round_token_counts() {
    // 1M input + 1M output at $3/$15 per million must be exactly $18.00
    let (_db, orchestrator) = engine(MockProvider::with_behavior(MockBehavior::Succeed {
        text: r#"{"quality_score": 0.8}"#.to_string(),
        input_tokens: 1_000_000,
        output_tokens: 1_000_000,
    }));
    let store = orchestrator.task_store().clone();

    let task = Task::new("Big campaign", TaskCategory::Marketing, 1).with_agent("marketing_copy");
    store.create(&task).unwrap();

    let result = orchestrator
        .execute_task(&task, TriggerSource::Workflow)
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.cost_microdollars, 18_000_000);
    assert!((result.cost_dollars() - 18.0).abs() < f64::EPSILON);
}

// ============================================================================
// End-to-End: Failure Path
// ============================================================================

#[tokio::test]
async fn test_model_failure_blocks_task_and_logs_failed_record() {
    let (_db, orchestrator) = engine(MockProvider::failing("model overloaded"));
    let store = orchestrator.task_store().clone();

    let task = Task::new("Product page", TaskCategory::Product, 1).with_agent("product_manager");
    store.create(&task).unwrap();

    let result = orchestrator
        .execute_task(&task, TriggerSource::Workflow)
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("model overloaded"));

    // backlog -> in_progress -> blocked, progress reset to 0
    let loaded = store.get(&task.id).unwrap().unwrap();
    assert_eq!(loaded.status, TaskStatus::Blocked);
    assert_eq!(loaded.progress, 0);

    let records = orchestrator
        .execution_log()
        .for_task(&task.id, LogOrder::OldestFirst)
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, ExecutionStatus::Failed);
    assert!(records[0].error_message.is_some());
}

#[tokio::test]
async fn test_batch_continues_past_individual_failures() {
    let (_db, orchestrator) = engine(MockProvider::failing("down"));
    let store = orchestrator.task_store().clone();

    for n in 0..3 {
        let task = Task::new(format!("task {}", n), TaskCategory::Content, 1)
            .with_agent("content_writer");
        store.create(&task).unwrap();
    }

    let batch = orchestrator.execute_batch(3).await.unwrap();
    assert_eq!(batch.total, 3);
    assert_eq!(batch.failed, 3);
    assert_eq!(batch.succeeded, 0);
}

// ============================================================================
// Gating
// ============================================================================

#[tokio::test]
async fn test_unmet_dependency_gates_and_leaves_status_unchanged() {
    let (_db, orchestrator) = engine(MockProvider::succeeding());
    let store = orchestrator.task_store().clone();

    let dep = Task::new("dependency", TaskCategory::Content, 1).with_agent("content_writer");
    store.create(&dep).unwrap();

    let task = Task::new("dependent", TaskCategory::Content, 1)
        .with_agent("content_writer")
        .with_dependencies(vec![dep.id.clone()]);
    store.create(&task).unwrap();

    assert!(!orchestrator.can_execute(&task).unwrap());

    let result = orchestrator
        .execute_task(&task, TriggerSource::Workflow)
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.execution_id.is_none(), "gating writes no execution record");

    // Store untouched
    let loaded = store.get(&task.id).unwrap().unwrap();
    assert_eq!(loaded.status, TaskStatus::Backlog);
    assert_eq!(loaded.progress, 0);
    assert!(loaded.started_at.is_none());
}

#[tokio::test]
async fn test_done_dependency_unlocks_task() {
    let (_db, orchestrator) = engine(MockProvider::succeeding());
    let store = orchestrator.task_store().clone();

    let dep = Task::new("dependency", TaskCategory::Content, 1).with_agent("content_writer");
    store.create(&dep).unwrap();
    let task = Task::new("dependent", TaskCategory::Content, 1)
        .with_agent("content_writer")
        .with_dependencies(vec![dep.id.clone()]);
    store.create(&task).unwrap();

    store
        .update(&dep.id, &TaskChanges::status(TaskStatus::Done).completed_now())
        .unwrap();

    assert!(orchestrator.can_execute(&task).unwrap());
}

#[tokio::test]
async fn test_missing_or_unknown_agent_gates() {
    let (_db, orchestrator) = engine(MockProvider::succeeding());
    let store = orchestrator.task_store().clone();

    let unassigned = Task::new("no agent", TaskCategory::Content, 1);
    store.create(&unassigned).unwrap();
    assert!(!orchestrator.can_execute(&unassigned).unwrap());

    let unknown = Task::new("ghost agent", TaskCategory::Content, 1).with_agent("ghost");
    store.create(&unknown).unwrap();
    assert!(!orchestrator.can_execute(&unknown).unwrap());

    let result = orchestrator
        .execute_task(&unknown, TriggerSource::Manual)
        .await
        .unwrap();
    assert!(!result.success);
    assert!(result.error.as_deref().unwrap().contains("not registered"));
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_priority_one_beats_priority_two_regardless_of_creation_order() {
    let (_db, orchestrator) = engine(MockProvider::succeeding());
    let store = orchestrator.task_store().clone();

    // Priority 2 created after (newer than) priority 1
    let urgent = Task::new("urgent", TaskCategory::Content, 1)
        .with_agent("content_writer")
        .with_created_at("2025-07-01T08:00:00Z");
    let less_urgent = Task::new("less urgent", TaskCategory::Content, 2)
        .with_agent("content_writer")
        .with_created_at("2025-07-01T09:00:00Z");
    store.create(&less_urgent).unwrap();
    store.create(&urgent).unwrap();

    let next = orchestrator.get_next_tasks(1).unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].title, "urgent");
}

#[tokio::test]
async fn test_batch_executes_in_priority_order() {
    let (_db, orchestrator) = engine(MockProvider::succeeding());
    let store = orchestrator.task_store().clone();

    for (title, priority) in [("third", 3), ("first", 1), ("second", 2)] {
        let task = Task::new(title, TaskCategory::Content, priority).with_agent("content_writer");
        store.create(&task).unwrap();
    }

    let next = orchestrator.get_next_tasks(3).unwrap();
    let titles: Vec<&str> = next.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second", "third"]);
}

#[tokio::test]
async fn test_ineligible_tasks_are_skipped_not_counted() {
    let (_db, orchestrator) = engine(MockProvider::succeeding());
    let store = orchestrator.task_store().clone();

    let gated = Task::new("gated", TaskCategory::Content, 1)
        .with_agent("content_writer")
        .with_dependencies(vec!["missing-dep".to_string()]);
    let runnable = Task::new("runnable", TaskCategory::Content, 2).with_agent("content_writer");
    store.create(&gated).unwrap();
    store.create(&runnable).unwrap();

    let next = orchestrator.get_next_tasks(1).unwrap();
    assert_eq!(next.len(), 1);
    assert_eq!(next[0].title, "runnable");
}

// ============================================================================
// Reporting
// ============================================================================

#[tokio::test]
async fn test_status_report_on_empty_store() {
    let (_db, orchestrator) = engine(MockProvider::succeeding());
    let report = orchestrator.get_status_report().unwrap();

    assert_eq!(report.total_tasks, 0);
    assert!(report.completion_rate.abs() < f64::EPSILON);
    // All four seeded agents appear in the snapshot
    assert_eq!(report.agent_performance.len(), 4);
    assert!(report.graph_insights.is_empty());
}

#[tokio::test]
async fn test_status_report_aggregates_execution_log() {
    let (_db, orchestrator) = engine(MockProvider::succeeding());
    let store = orchestrator.task_store().clone();

    let task = Task::new("t", TaskCategory::Content, 1).with_agent("content_writer");
    store.create(&task).unwrap();
    orchestrator.execute_batch(1).await.unwrap();

    let report = orchestrator.get_status_report().unwrap();
    let writer = report
        .agent_performance
        .iter()
        .find(|p| p.agent_name == "content_writer")
        .unwrap();
    assert_eq!(writer.executions, 1);
    assert_eq!(writer.successful_executions, 1);
    assert!(writer.total_tokens > 0);
}

#[tokio::test]
async fn test_completion_rate() {
    let (_db, orchestrator) = engine(MockProvider::succeeding());
    let store = orchestrator.task_store().clone();

    let done = Task::new("done", TaskCategory::Content, 1).with_agent("content_writer");
    let open = Task::new("open", TaskCategory::Content, 1).with_agent("content_writer");
    store.create(&done).unwrap();
    store.create(&open).unwrap();
    store
        .update(&done.id, &TaskChanges::status(TaskStatus::Done))
        .unwrap();

    let report = orchestrator.get_status_report().unwrap();
    assert_eq!(report.total_tasks, 2);
    assert!((report.completion_rate - 0.5).abs() < f64::EPSILON);
}
