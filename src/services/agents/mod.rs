//! Agents
//!
//! The closed set of specialized agents and the registry that holds them.
//! Each agent binds a stored profile (system prompt, model parameters) to a
//! prompt template and an output processor for one task category, and runs
//! one full invocation attempt end to end: prompt, model call, parse, cost,
//! execution record, task status transition.
//!
//! The agent set is known at build time; all instances are constructed
//! eagerly at startup, and a profile missing from the database is a
//! configuration error there, not a dispatch-time surprise.

pub mod output;
pub mod prompts;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use crate::models::agent::AgentProfile;
use crate::models::execution::{
    ExecutionKind, ExecutionRecord, ExecutionResult, TriggerSource,
};
use crate::models::task::{Task, TaskCategory, TaskChanges, TaskStatus};
use crate::services::agent_profiles::AgentProfileStore;
use crate::services::execution_log::ExecutionLog;
use crate::services::llm::{CompletionRequest, LlmProvider};
use crate::services::pricing::CostCalculator;
use crate::services::task_store::TaskStore;
use crate::utils::error::{AppError, AppResult};

pub use output::{ParsedOutput, FALLBACK_QUALITY};

/// The closed set of agent kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentKind {
    ContentWriter,
    SeoSpecialist,
    ProductManager,
    MarketingCopy,
}

impl AgentKind {
    /// All agent kinds
    pub fn all() -> [AgentKind; 4] {
        [
            Self::ContentWriter,
            Self::SeoSpecialist,
            Self::ProductManager,
            Self::MarketingCopy,
        ]
    }

    /// Stable agent name used in task assignments and the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentWriter => "content_writer",
            Self::SeoSpecialist => "seo_specialist",
            Self::ProductManager => "product_manager",
            Self::MarketingCopy => "marketing_copy",
        }
    }

    /// The task category this agent covers
    pub fn category(&self) -> TaskCategory {
        match self {
            Self::ContentWriter => TaskCategory::Content,
            Self::SeoSpecialist => TaskCategory::Seo,
            Self::ProductManager => TaskCategory::Product,
            Self::MarketingCopy => TaskCategory::Marketing,
        }
    }

    /// Quality score assigned to parsed output that did not report one
    pub fn default_quality(&self) -> f64 {
        match self {
            Self::ContentWriter => 0.8,
            _ => 0.85,
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content_writer" => Ok(Self::ContentWriter),
            "seo_specialist" => Ok(Self::SeoSpecialist),
            "product_manager" => Ok(Self::ProductManager),
            "marketing_copy" => Ok(Self::MarketingCopy),
            _ => Err(format!("Unknown agent name: {}", s)),
        }
    }
}

/// One specialized agent bound to its stored profile and collaborators
pub struct Agent {
    kind: AgentKind,
    profile: AgentProfile,
    llm: Arc<dyn LlmProvider>,
    pricing: Arc<CostCalculator>,
    tasks: TaskStore,
    log: ExecutionLog,
}

impl Agent {
    /// Create an agent from its profile and collaborators
    pub fn new(
        kind: AgentKind,
        profile: AgentProfile,
        llm: Arc<dyn LlmProvider>,
        pricing: Arc<CostCalculator>,
        tasks: TaskStore,
        log: ExecutionLog,
    ) -> Self {
        Self {
            kind,
            profile,
            llm,
            pricing,
            tasks,
            log,
        }
    }

    /// The agent's kind
    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// The stored profile backing this agent
    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    /// Build the user prompt for a task. Pure function of the task fields.
    pub fn generate_prompt(&self, task: &Task) -> String {
        prompts::build_prompt(self.kind, task)
    }

    /// Process a raw completion into structured, scored output. Never fails.
    pub fn process_output(&self, raw: &str) -> ParsedOutput {
        output::process_output(self.kind, raw)
    }

    /// Run one full invocation attempt for a task.
    ///
    /// On model success the task moves to `review` with the output and
    /// quality score; on model failure it moves to `blocked` with progress
    /// reset to 0. Either way an execution record is appended. Model errors
    /// are captured in the returned result; only primary-storage errors
    /// propagate as `Err`.
    pub async fn execute_task(
        &self,
        task: &Task,
        trigger: TriggerSource,
    ) -> AppResult<ExecutionResult> {
        let started = Instant::now();
        let prompt = self.generate_prompt(task);

        tracing::info!(
            task_id = %task.id,
            agent = %self.profile.agent_name,
            "Executing task"
        );

        let request = CompletionRequest {
            system_prompt: self.profile.system_prompt.clone(),
            user_prompt: prompt.clone(),
            model: self.profile.model.clone(),
            max_tokens: self.profile.max_tokens,
            temperature: self.profile.temperature,
        };

        match self.llm.complete(request).await {
            Ok(completion) => {
                let parsed = self.process_output(&completion.text);
                let duration_ms = started.elapsed().as_millis() as i64;
                let cost = self.pricing.calculate_cost(
                    &self.profile.model,
                    completion.input_tokens,
                    completion.output_tokens,
                );

                let record = ExecutionRecord::begin(
                    task.id.clone(),
                    self.profile.agent_name.clone(),
                    ExecutionKind::Generation,
                    trigger,
                    self.profile.model.clone(),
                )
                .with_prompt(prompt)
                .succeed(
                    parsed.data.clone(),
                    parsed.quality_score,
                    completion.input_tokens,
                    completion.output_tokens,
                    cost,
                    duration_ms,
                );
                let execution_id = self.log.append(&record)?;

                self.tasks.update(
                    &task.id,
                    &TaskChanges::status(TaskStatus::Review)
                        .progress(80)
                        .output_data(parsed.data.clone())
                        .quality_score(parsed.quality_score),
                )?;

                tracing::info!(
                    task_id = %task.id,
                    tokens = completion.input_tokens + completion.output_tokens,
                    cost = %CostCalculator::format_cost_dollars(cost),
                    "Task executed successfully"
                );

                Ok(ExecutionResult {
                    success: true,
                    task_id: task.id.clone(),
                    execution_id: Some(execution_id),
                    output: Some(parsed.data),
                    quality_score: Some(parsed.quality_score),
                    error: None,
                    input_tokens: completion.input_tokens,
                    output_tokens: completion.output_tokens,
                    cost_microdollars: cost,
                    duration_ms,
                })
            }
            Err(e) => {
                let duration_ms = started.elapsed().as_millis() as i64;
                tracing::error!(
                    task_id = %task.id,
                    agent = %self.profile.agent_name,
                    error = %e,
                    "Task execution failed"
                );

                let record = ExecutionRecord::begin(
                    task.id.clone(),
                    self.profile.agent_name.clone(),
                    ExecutionKind::Generation,
                    trigger,
                    self.profile.model.clone(),
                )
                .with_prompt(prompt)
                .fail(e.to_string(), duration_ms);
                let execution_id = self.log.append(&record)?;

                self.tasks.update(
                    &task.id,
                    &TaskChanges::status(TaskStatus::Blocked).progress(0),
                )?;

                Ok(ExecutionResult {
                    success: false,
                    task_id: task.id.clone(),
                    execution_id: Some(execution_id),
                    output: None,
                    quality_score: None,
                    error: Some(e.to_string()),
                    input_tokens: 0,
                    output_tokens: 0,
                    cost_microdollars: 0,
                    duration_ms,
                })
            }
        }
    }
}

/// Build the full agent registry eagerly from stored profiles.
///
/// Fails with a configuration error if any built-in agent lacks an active,
/// valid profile.
pub fn build_registry(
    profiles: &AgentProfileStore,
    llm: Arc<dyn LlmProvider>,
    pricing: Arc<CostCalculator>,
    tasks: TaskStore,
    log: ExecutionLog,
) -> AppResult<HashMap<AgentKind, Agent>> {
    let mut registry = HashMap::new();

    for kind in AgentKind::all() {
        let profile = profiles.get(kind.as_str())?.ok_or_else(|| {
            AppError::config(format!(
                "No active profile for agent '{}'",
                kind.as_str()
            ))
        })?;
        profile.validate().map_err(|e| {
            AppError::config(format!("Invalid profile for agent '{}': {}", kind.as_str(), e))
        })?;

        registry.insert(
            kind,
            Agent::new(
                kind,
                profile,
                Arc::clone(&llm),
                Arc::clone(&pricing),
                tasks.clone(),
                log.clone(),
            ),
        );
    }

    Ok(registry)
}
