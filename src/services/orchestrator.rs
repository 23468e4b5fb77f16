//! Strategy Orchestrator
//!
//! Pulls backlog tasks, gates them on dependencies and agent availability,
//! dispatches to the registered agents and aggregates reporting. Mirror and
//! learning writes are best-effort: failures there are logged and swallowed,
//! never allowed to alter the primary result. Only primary-storage failures
//! propagate out of the execution paths.

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::graph::{AgentNode, ExecutionNode, TaskNode};
use crate::models::report::{AgentPerformance, BatchResult, StatusReport, TaskInsights};
use crate::models::task::{Task, TaskChanges, TaskStatus};
use crate::models::execution::{ExecutionResult, TriggerSource};
use crate::services::agent_profiles::AgentProfileStore;
use crate::services::agents::{build_registry, Agent, AgentKind};
use crate::services::execution_log::ExecutionLog;
use crate::services::graph::GraphMirror;
use crate::services::learning::{FeedbackData, FeedbackKind, LearningSystem};
use crate::services::llm::LlmProvider;
use crate::services::pricing::CostCalculator;
use crate::services::task_store::TaskStore;
use crate::storage::database::Database;
use crate::utils::error::AppResult;

/// Orchestrates task execution across the registered agents
pub struct Orchestrator {
    tasks: TaskStore,
    log: ExecutionLog,
    profiles: AgentProfileStore,
    agents: HashMap<AgentKind, Agent>,
    mirror: Arc<dyn GraphMirror>,
    learning: LearningSystem,
}

impl Orchestrator {
    /// Build the orchestrator: load all agent profiles, construct the full
    /// registry eagerly and seed the mirror's agent nodes. Fails on a
    /// missing or invalid profile — configuration errors surface at
    /// startup, not at dispatch time.
    pub fn new(
        db: &Database,
        llm: Arc<dyn LlmProvider>,
        mirror: Arc<dyn GraphMirror>,
    ) -> AppResult<Self> {
        let tasks = TaskStore::new(db);
        let log = ExecutionLog::new(db);
        let profiles = AgentProfileStore::new(db);
        let pricing = Arc::new(CostCalculator::new());

        let agents = build_registry(&profiles, llm, pricing, tasks.clone(), log.clone())?;

        let orchestrator = Self {
            tasks,
            log,
            profiles,
            agents,
            mirror: Arc::clone(&mirror),
            learning: LearningSystem::new(mirror),
        };
        orchestrator.init_agent_nodes();
        Ok(orchestrator)
    }

    /// The task store this orchestrator operates on
    pub fn task_store(&self) -> &TaskStore {
        &self.tasks
    }

    /// The execution log this orchestrator writes to
    pub fn execution_log(&self) -> &ExecutionLog {
        &self.log
    }

    /// Seed the mirror with the registered agents, best-effort
    fn init_agent_nodes(&self) {
        for agent in self.agents.values() {
            let profile = agent.profile();
            let node = AgentNode {
                name: profile.agent_name.clone(),
                agent_type: agent.kind().category().as_str().to_string(),
                active: profile.active,
                tasks_completed: profile.tasks_completed,
                avg_quality_score: profile.avg_quality_score.unwrap_or(0.0),
                success_rate: profile.success_rate.unwrap_or(0.0),
            };
            if let Err(e) = self.mirror.upsert_agent(&node) {
                tracing::warn!(agent = %profile.agent_name, error = %e, "Graph mirror agent upsert failed");
            }
        }
    }

    /// The `limit` most urgent eligible backlog tasks, in store order
    pub fn get_next_tasks(&self, limit: usize) -> AppResult<Vec<Task>> {
        let backlog = self.tasks.get_by_status(TaskStatus::Backlog)?;
        let mut eligible = Vec::new();
        for task in backlog {
            if eligible.len() == limit {
                break;
            }
            if self.gating_failure(&task)?.is_none() {
                eligible.push(task);
            }
        }
        Ok(eligible)
    }

    /// Whether a task is currently executable: every dependency is `done`,
    /// an agent is assigned, and that agent is registered
    pub fn can_execute(&self, task: &Task) -> AppResult<bool> {
        Ok(self.gating_failure(task)?.is_none())
    }

    /// The reason a task cannot execute, if any. A gating check, not an
    /// error: the failure reason is logged and reported, never raised.
    fn gating_failure(&self, task: &Task) -> AppResult<Option<String>> {
        for dep_id in &task.dependencies {
            match self.tasks.get(dep_id)? {
                Some(dep) if dep.status == TaskStatus::Done => {}
                Some(dep) => {
                    let reason =
                        format!("Dependency {} is not done (status: {})", dep_id, dep.status);
                    tracing::warn!(task_id = %task.id, %reason, "Task gated");
                    return Ok(Some(reason));
                }
                None => {
                    let reason = format!("Dependency {} does not exist", dep_id);
                    tracing::warn!(task_id = %task.id, %reason, "Task gated");
                    return Ok(Some(reason));
                }
            }
        }

        if let Err(reason) = self.resolve_agent(task) {
            tracing::warn!(task_id = %task.id, %reason, "Task gated");
            return Ok(Some(reason));
        }

        Ok(None)
    }

    /// Resolve the agent assigned to a task against the registry
    fn resolve_agent(&self, task: &Task) -> Result<&Agent, String> {
        let name = task
            .agent_name
            .as_deref()
            .ok_or_else(|| "No agent assigned".to_string())?;
        let kind: AgentKind = name
            .parse()
            .map_err(|_| format!("Agent '{}' is not registered", name))?;
        self.agents
            .get(&kind)
            .ok_or_else(|| format!("Agent '{}' is not registered", name))
    }

    /// Execute a single task.
    ///
    /// When the gating check fails, returns a failure result immediately
    /// without touching the task store. Otherwise claims the task
    /// (`in_progress`, progress 20), dispatches to the assigned agent and,
    /// on success, mirrors the lineage and records learning feedback
    /// best-effort. Returns the agent's result unmodified.
    pub async fn execute_task(
        &self,
        task: &Task,
        trigger: TriggerSource,
    ) -> AppResult<ExecutionResult> {
        if let Some(reason) = self.gating_failure(task)? {
            return Ok(ExecutionResult::rejected(task.id.clone(), reason));
        }

        match self.learning.recommendations(task.category.as_str()) {
            Ok(recommendations) if !recommendations.is_empty() => {
                tracing::info!(
                    task_id = %task.id,
                    count = recommendations.len(),
                    "Recommendations available from learned patterns"
                );
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(task_id = %task.id, error = %e, "Recommendation lookup failed"),
        }

        if let Err(e) = self.mirror.upsert_task(&task_node(task)) {
            tracing::warn!(task_id = %task.id, error = %e, "Graph mirror task upsert failed");
        }

        self.tasks.update(
            &task.id,
            &TaskChanges::status(TaskStatus::InProgress)
                .progress(20)
                .started_now(),
        )?;

        // Gating passed, so the agent resolves
        let agent = match self.resolve_agent(task) {
            Ok(agent) => agent,
            Err(reason) => return Ok(ExecutionResult::rejected(task.id.clone(), reason)),
        };

        let started_at = chrono::Utc::now().to_rfc3339();
        let result = agent.execute_task(task, trigger).await?;

        if result.success {
            self.mirror_success(task, agent, trigger, &result, &started_at);
        }

        Ok(result)
    }

    /// Best-effort lineage and learning writes after a successful attempt
    fn mirror_success(
        &self,
        task: &Task,
        agent: &Agent,
        trigger: TriggerSource,
        result: &ExecutionResult,
        started_at: &str,
    ) {
        let Some(execution_id) = result.execution_id.as_deref() else {
            return;
        };
        let quality_score = result.quality_score.unwrap_or(0.0);

        let node = ExecutionNode {
            execution_id: execution_id.to_string(),
            agent_name: agent.profile().agent_name.clone(),
            task_id: task.id.clone(),
            status: "success".to_string(),
            quality_score,
            tokens_used: result.input_tokens + result.output_tokens,
            cost_microdollars: result.cost_microdollars,
            model_used: agent.profile().model.clone(),
            trigger_source: trigger.as_str().to_string(),
            started_at: started_at.to_string(),
        };
        if let Err(e) = self.mirror.record_execution(&node) {
            tracing::warn!(task_id = %task.id, error = %e, "Graph mirror execution write failed");
        }

        let feedback = FeedbackData {
            task_category: Some(task.category.as_str().to_string()),
            agent_name: Some(agent.profile().agent_name.clone()),
            // Improvement over a neutral 0.5 baseline
            quality_delta: Some(quality_score - 0.5),
            performance_delta: Some(0.1),
            ..Default::default()
        };
        if let Err(e) =
            self.learning
                .record_feedback(execution_id, FeedbackKind::QualityImprovement, &feedback)
        {
            tracing::warn!(task_id = %task.id, error = %e, "Learning feedback write failed");
        }
    }

    /// Execute up to `limit` eligible tasks sequentially.
    ///
    /// Sequential on purpose: task status transitions must observe a single
    /// in-flight attempt per task, and cost/quality reporting stays in
    /// deterministic order. No individual task failure aborts the batch.
    pub async fn execute_batch(&self, limit: usize) -> AppResult<BatchResult> {
        let tasks = self.get_next_tasks(limit)?;
        let mut batch = BatchResult {
            total: tasks.len(),
            succeeded: 0,
            failed: 0,
            results: Vec::with_capacity(tasks.len()),
        };

        for task in &tasks {
            tracing::info!(task_id = %task.id, title = %task.title, "Processing task");
            let result = self.execute_task(task, TriggerSource::Workflow).await?;
            if result.success {
                batch.succeeded += 1;
            } else {
                batch.failed += 1;
            }
            batch.results.push(result);
        }

        Ok(batch)
    }

    /// Overall orchestration status: per-status counts, agent performance,
    /// completion rate and best-effort graph/learning insights
    pub fn get_status_report(&self) -> AppResult<StatusReport> {
        let status_breakdown = self.tasks.count_by_status()?;
        let total_tasks: i64 = status_breakdown.values().sum();
        let done = status_breakdown.get("done").copied().unwrap_or(0);
        let completion_rate = if total_tasks == 0 {
            0.0
        } else {
            done as f64 / total_tasks as f64
        };

        let mut agent_performance = Vec::new();
        for profile in self.profiles.list_active()? {
            let stats = self.log.agent_stats(&profile.agent_name)?;
            agent_performance.push(AgentPerformance {
                agent_name: profile.agent_name,
                tasks_completed: profile.tasks_completed,
                avg_quality_score: profile.avg_quality_score,
                success_rate: profile.success_rate,
                executions: stats.executions,
                successful_executions: stats.successful,
                total_tokens: stats.total_tokens,
                total_cost_microdollars: stats.total_cost_microdollars,
            });
        }

        let mut graph_insights = HashMap::new();
        for kind in AgentKind::all() {
            match self.mirror.agent_performance(kind.as_str()) {
                Ok(Some(stats)) => {
                    graph_insights.insert(kind.as_str().to_string(), stats);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(agent = %kind, error = %e, "Graph mirror performance query failed")
                }
            }
        }

        let learning = match self.learning.report() {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!(error = %e, "Learning report failed");
                None
            }
        };

        Ok(StatusReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            status_breakdown,
            agent_performance,
            total_tasks,
            completion_rate,
            graph_insights,
            learning,
        })
    }

    /// Lineage insights for one task from the mirror. Best-effort: with the
    /// mirror absent or unreachable this is empty, not an error.
    pub fn get_task_insights(&self, task_id: &str) -> TaskInsights {
        let executions = match self.mirror.task_history(task_id) {
            Ok(executions) => executions,
            Err(e) => {
                tracing::warn!(task_id = %task_id, error = %e, "Graph mirror history query failed");
                Vec::new()
            }
        };

        let execution_count = executions.len();
        let avg_quality = if execution_count == 0 {
            0.0
        } else {
            executions.iter().map(|e| e.quality_score).sum::<f64>() / execution_count as f64
        };

        let mut learned_patterns: Vec<String> = executions
            .iter()
            .flat_map(|e| e.learned_patterns.iter().cloned())
            .collect();
        learned_patterns.sort();
        learned_patterns.dedup();

        TaskInsights {
            task_id: task_id.to_string(),
            execution_count,
            executions,
            avg_quality,
            learned_patterns,
        }
    }
}

fn task_node(task: &Task) -> TaskNode {
    TaskNode {
        task_id: task.id.clone(),
        title: task.title.clone(),
        description: task.description.clone().unwrap_or_default(),
        status: task.status.as_str().to_string(),
        priority: task.priority,
        category: task.category.as_str().to_string(),
        tags: task.tags.clone(),
        created_at: task.created_at.clone(),
    }
}
