//! Execution Models
//!
//! Immutable audit records for agent invocation attempts, plus the result
//! value an attempt returns to its caller. Execution records are append-only;
//! nothing mutates them after creation.

use serde::{Deserialize, Serialize};

/// Kind of work an execution performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionKind {
    /// Fresh content generation
    Generation,
    /// Revision of previously produced output
    Revision,
    /// Optimization pass over existing output
    Optimization,
    /// Validation of produced output
    Validation,
}

impl ExecutionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generation => "generation",
            Self::Revision => "revision",
            Self::Optimization => "optimization",
            Self::Validation => "validation",
        }
    }
}

impl std::fmt::Display for ExecutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExecutionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generation" => Ok(Self::Generation),
            "revision" => Ok(Self::Revision),
            "optimization" => Ok(Self::Optimization),
            "validation" => Ok(Self::Validation),
            _ => Err(format!("Unknown execution kind: {}", s)),
        }
    }
}

/// What triggered an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerSource {
    /// A human kicked it off directly
    Manual,
    /// The orchestrator's batch workflow
    Workflow,
    /// A scheduler (cron-style continuous mode)
    Scheduled,
}

impl TriggerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Workflow => "workflow",
            Self::Scheduled => "scheduled",
        }
    }
}

impl std::fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TriggerSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "workflow" => Ok(Self::Workflow),
            "scheduled" => Ok(Self::Scheduled),
            _ => Err(format!("Unknown trigger source: {}", s)),
        }
    }
}

/// Terminal (or in-flight) status of an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Running,
    Success,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown execution status: {}", s)),
        }
    }
}

/// Immutable audit record for one agent invocation attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// Unique record identifier (UUID)
    pub id: String,
    /// Task the attempt was for
    pub task_id: String,
    /// Agent that ran the attempt
    pub agent_name: String,
    /// Kind of work performed
    pub kind: ExecutionKind,
    /// What triggered the attempt
    pub trigger: TriggerSource,
    /// Outcome of the attempt
    pub status: ExecutionStatus,
    /// Full prompt sent to the model
    pub input_prompt: Option<String>,
    /// Structured output payload
    pub output_data: Option<serde_json::Value>,
    /// Model that served the completion
    pub model_used: String,
    /// Input tokens consumed
    pub input_tokens: i64,
    /// Output tokens generated
    pub output_tokens: i64,
    /// Cost in microdollars (1 USD = 1,000,000 microdollars)
    pub cost_microdollars: i64,
    /// Quality score of the output in [0, 1]
    pub quality_score: Option<f64>,
    /// Error message when the attempt failed
    pub error_message: Option<String>,
    /// When the attempt started (RFC 3339)
    pub started_at: String,
    /// When the attempt finished (RFC 3339)
    pub completed_at: Option<String>,
    /// Wall-clock duration in milliseconds
    pub duration_ms: Option<i64>,
}

impl ExecutionRecord {
    /// Start a new record for an attempt that is beginning now
    pub fn begin(
        task_id: impl Into<String>,
        agent_name: impl Into<String>,
        kind: ExecutionKind,
        trigger: TriggerSource,
        model_used: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            task_id: task_id.into(),
            agent_name: agent_name.into(),
            kind,
            trigger,
            status: ExecutionStatus::Running,
            input_prompt: None,
            output_data: None,
            model_used: model_used.into(),
            input_tokens: 0,
            output_tokens: 0,
            cost_microdollars: 0,
            quality_score: None,
            error_message: None,
            started_at: chrono::Utc::now().to_rfc3339(),
            completed_at: None,
            duration_ms: None,
        }
    }

    /// Builder pattern: attach the prompt that was sent to the model
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.input_prompt = Some(prompt.into());
        self
    }

    /// Finish the record as a success
    pub fn succeed(
        mut self,
        output: serde_json::Value,
        quality_score: f64,
        input_tokens: i64,
        output_tokens: i64,
        cost_microdollars: i64,
        duration_ms: i64,
    ) -> Self {
        self.status = ExecutionStatus::Success;
        self.output_data = Some(output);
        self.quality_score = Some(quality_score);
        self.input_tokens = input_tokens;
        self.output_tokens = output_tokens;
        self.cost_microdollars = cost_microdollars;
        self.duration_ms = Some(duration_ms);
        self.completed_at = Some(chrono::Utc::now().to_rfc3339());
        self
    }

    /// Finish the record as a failure
    pub fn fail(mut self, error: impl Into<String>, duration_ms: i64) -> Self {
        self.status = ExecutionStatus::Failed;
        self.error_message = Some(error.into());
        self.duration_ms = Some(duration_ms);
        self.completed_at = Some(chrono::Utc::now().to_rfc3339());
        self
    }

    /// Cost in dollars for display
    pub fn cost_dollars(&self) -> f64 {
        self.cost_microdollars as f64 / 1_000_000.0
    }

    /// Total tokens consumed by the attempt
    pub fn total_tokens(&self) -> i64 {
        self.input_tokens + self.output_tokens
    }
}

/// Result of one task execution attempt, returned to the orchestrator's caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Whether the attempt produced reviewable output
    pub success: bool,
    /// Task the attempt was for
    pub task_id: String,
    /// Id of the execution record, when one was written
    pub execution_id: Option<String>,
    /// Structured output on success
    pub output: Option<serde_json::Value>,
    /// Quality score of the output on success
    pub quality_score: Option<f64>,
    /// Error message on failure
    pub error: Option<String>,
    /// Input tokens consumed
    pub input_tokens: i64,
    /// Output tokens generated
    pub output_tokens: i64,
    /// Cost in microdollars
    pub cost_microdollars: i64,
    /// Wall-clock duration in milliseconds
    pub duration_ms: i64,
}

impl ExecutionResult {
    /// A failure result for a task that never reached execution (gating)
    pub fn rejected(task_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            success: false,
            task_id: task_id.into(),
            execution_id: None,
            output: None,
            quality_score: None,
            error: Some(reason.into()),
            input_tokens: 0,
            output_tokens: 0,
            cost_microdollars: 0,
            duration_ms: 0,
        }
    }

    /// Cost in dollars for display
    pub fn cost_dollars(&self) -> f64 {
        self.cost_microdollars as f64 / 1_000_000.0
    }
}
