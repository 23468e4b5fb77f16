//! Task Models
//!
//! Data structures for strategy tasks and their status lifecycle.
//!
//! A task moves `backlog -> in_progress -> {review | blocked}` under the
//! orchestrator; `review` is later moved to approved/rejected/done by the
//! external approval workflow. `blocked` stays terminal unless a human
//! resets it. Nothing is reachable from `done`.

use serde::{Deserialize, Serialize};

/// Task status lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Waiting to be picked up by the orchestrator
    Backlog,
    /// Claimed by the orchestrator, execution underway
    InProgress,
    /// Agent output produced, awaiting human review
    Review,
    /// Approved by the review workflow
    Approved,
    /// Rejected by the review workflow
    Rejected,
    /// Fully completed; dependencies on this task are satisfied
    Done,
    /// Execution failed; requires manual intervention
    Blocked,
}

impl TaskStatus {
    /// All statuses, in lifecycle order
    pub fn all() -> [TaskStatus; 7] {
        [
            Self::Backlog,
            Self::InProgress,
            Self::Review,
            Self::Approved,
            Self::Rejected,
            Self::Done,
            Self::Blocked,
        ]
    }

    /// Stable string form used in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Backlog => "backlog",
            Self::InProgress => "in_progress",
            Self::Review => "review",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "backlog" => Ok(Self::Backlog),
            "in_progress" => Ok(Self::InProgress),
            "review" => Ok(Self::Review),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "done" => Ok(Self::Done),
            "blocked" => Ok(Self::Blocked),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

/// Task category, one per content domain the agents cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Content,
    Seo,
    Product,
    Marketing,
    Technical,
    Ux,
    Business,
}

impl TaskCategory {
    /// Stable string form used in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Seo => "seo",
            Self::Product => "product",
            Self::Marketing => "marketing",
            Self::Technical => "technical",
            Self::Ux => "ux",
            Self::Business => "business",
        }
    }
}

impl std::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "content" => Ok(Self::Content),
            "seo" => Ok(Self::Seo),
            "product" => Ok(Self::Product),
            "marketing" => Ok(Self::Marketing),
            "technical" => Ok(Self::Technical),
            "ux" => Ok(Self::Ux),
            "business" => Ok(Self::Business),
            _ => Err(format!("Unknown task category: {}", s)),
        }
    }
}

/// A strategy task tracked through the status lifecycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier (UUID)
    pub id: String,
    /// Short task title
    pub title: String,
    /// Longer description of the work
    pub description: Option<String>,
    /// Content domain the task belongs to
    pub category: TaskCategory,
    /// Priority; lower value = more urgent
    pub priority: i32,
    /// Ordered list of task ids that must be `done` first
    pub dependencies: Vec<String>,
    /// Name of the agent assigned to execute this task
    pub agent_name: Option<String>,
    /// Current lifecycle status
    pub status: TaskStatus,
    /// Progress percentage in [0, 100]
    pub progress: i32,
    /// Structured output payload produced by the agent
    pub output_data: Option<serde_json::Value>,
    /// Quality score in [0, 1] once the output has been scored
    pub quality_score: Option<f64>,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Last update timestamp (RFC 3339)
    pub updated_at: String,
    /// When execution started (RFC 3339)
    pub started_at: Option<String>,
    /// When the task reached a terminal state (RFC 3339)
    pub completed_at: Option<String>,
}

impl Task {
    /// Create a new backlog task with a generated UUID
    pub fn new(title: impl Into<String>, category: TaskCategory, priority: i32) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            description: None,
            category,
            priority,
            dependencies: Vec::new(),
            agent_name: None,
            status: TaskStatus::Backlog,
            progress: 0,
            output_data: None,
            quality_score: None,
            tags: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            started_at: None,
            completed_at: None,
        }
    }

    /// Builder pattern: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder pattern: set the assigned agent
    pub fn with_agent(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = Some(agent_name.into());
        self
    }

    /// Builder pattern: set dependencies
    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Builder pattern: set creation timestamp
    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = created_at.into();
        self
    }
}

/// Partial update applied to a stored task.
///
/// Only fields set to `Some` are written; everything else is left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub status: Option<TaskStatus>,
    pub progress: Option<i32>,
    pub output_data: Option<serde_json::Value>,
    pub quality_score: Option<f64>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
}

impl TaskChanges {
    /// Start from a status change
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Set progress percentage
    pub fn progress(mut self, progress: i32) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Set the output payload
    pub fn output_data(mut self, output: serde_json::Value) -> Self {
        self.output_data = Some(output);
        self
    }

    /// Set the quality score
    pub fn quality_score(mut self, score: f64) -> Self {
        self.quality_score = Some(score);
        self
    }

    /// Stamp the execution start time with now
    pub fn started_now(mut self) -> Self {
        self.started_at = Some(chrono::Utc::now().to_rfc3339());
        self
    }

    /// Stamp the completion time with now
    pub fn completed_now(mut self) -> Self {
        self.completed_at = Some(chrono::Utc::now().to_rfc3339());
        self
    }

    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.progress.is_none()
            && self.output_data.is_none()
            && self.quality_score.is_none()
            && self.started_at.is_none()
            && self.completed_at.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation_defaults() {
        let task = Task::new("Write landing page", TaskCategory::Content, 1);
        assert!(!task.id.is_empty());
        assert_eq!(task.status, TaskStatus::Backlog);
        assert_eq!(task.progress, 0);
        assert!(task.dependencies.is_empty());
        assert!(task.output_data.is_none());
    }

    #[test]
    fn test_task_builder() {
        let task = Task::new("Optimize meta tags", TaskCategory::Seo, 2)
            .with_description("Meta tags for the heat pump range")
            .with_agent("seo_specialist")
            .with_dependencies(vec!["dep-1".to_string()]);

        assert_eq!(task.agent_name.as_deref(), Some("seo_specialist"));
        assert_eq!(task.dependencies, vec!["dep-1".to_string()]);
    }

    #[test]
    fn test_status_round_trip() {
        for status in TaskStatus::all() {
            let parsed: TaskStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("bogus".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_category_round_trip() {
        let parsed: TaskCategory = "marketing".parse().unwrap();
        assert_eq!(parsed, TaskCategory::Marketing);
        assert!("cooking".parse::<TaskCategory>().is_err());
    }

    #[test]
    fn test_changes_empty() {
        assert!(TaskChanges::default().is_empty());
        assert!(!TaskChanges::status(TaskStatus::Review).is_empty());
    }
}
