//! Data Models
//!
//! Core data structures shared across services and storage.

pub mod agent;
pub mod execution;
pub mod graph;
pub mod report;
pub mod task;

pub use agent::AgentProfile;
pub use execution::{
    ExecutionKind, ExecutionRecord, ExecutionResult, ExecutionStatus, TriggerSource,
};
pub use report::{BatchResult, StatusReport, TaskInsights};
pub use task::{Task, TaskCategory, TaskChanges, TaskStatus};
