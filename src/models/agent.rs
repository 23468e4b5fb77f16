//! Agent Profile Models
//!
//! Stored configuration for the specialized agents: system prompt, model
//! parameters and rolling performance stats. Profiles are loaded once when
//! the orchestrator builds its registry and treated as read-mostly; the
//! rolling stats are maintained out-of-band by the approval workflow.

use serde::{Deserialize, Serialize};

/// Stored configuration and performance stats for one agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Unique agent name (e.g. "content_writer")
    pub agent_name: String,
    /// Human-readable display name
    pub display_name: String,
    /// Description of what the agent does
    pub description: Option<String>,
    /// System prompt that defines the agent's behaviour
    pub system_prompt: String,
    /// Model identifier (e.g. "claude-sonnet-4-5-20250929")
    pub model: String,
    /// Maximum output tokens per completion
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Number of tasks this agent has completed
    pub tasks_completed: i64,
    /// Rolling average quality score in [0, 1]
    pub avg_quality_score: Option<f64>,
    /// Rolling success rate in [0, 1]
    pub success_rate: Option<f64>,
    /// Whether the agent may be dispatched to
    pub active: bool,
    /// Creation timestamp (RFC 3339)
    pub created_at: Option<String>,
    /// Last update timestamp (RFC 3339)
    pub updated_at: Option<String>,
}

impl AgentProfile {
    /// Create a new active profile with zeroed stats
    pub fn new(
        agent_name: impl Into<String>,
        display_name: impl Into<String>,
        system_prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            agent_name: agent_name.into(),
            display_name: display_name.into(),
            description: None,
            system_prompt: system_prompt.into(),
            model: model.into(),
            max_tokens: 4096,
            temperature: 1.0,
            tasks_completed: 0,
            avg_quality_score: None,
            success_rate: None,
            active: true,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        }
    }

    /// Builder pattern: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder pattern: set the output token budget
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Builder pattern: set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Validate the profile before it backs a live agent
    pub fn validate(&self) -> Result<(), String> {
        if self.agent_name.trim().is_empty() {
            return Err("Agent name cannot be empty".to_string());
        }
        if self.system_prompt.trim().is_empty() {
            return Err("System prompt cannot be empty".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("Model cannot be empty".to_string());
        }
        if self.max_tokens == 0 {
            return Err("Max tokens must be positive".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("Temperature must be in [0.0, 2.0]".to_string());
        }
        Ok(())
    }
}
