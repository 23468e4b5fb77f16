//! Calor Strategy - Task Orchestration Engine
//!
//! Backend library for Calor's marketing-strategy automation. It includes:
//! - A task queue with dependency gating and a status lifecycle
//! - A closed registry of specialized prompt/response agents
//! - An append-only execution log with cost and quality metrics
//! - A best-effort graph mirror for lineage and pattern learning
//! - Storage layer (SQLite, JSON settings) and data models

pub mod models;
pub mod services;
pub mod storage;
pub mod utils;

pub use models::{
    BatchResult, ExecutionKind, ExecutionRecord, ExecutionResult, ExecutionStatus, StatusReport,
    Task, TaskCategory, TaskChanges, TaskInsights, TaskStatus, TriggerSource,
};
pub use services::{
    AgentKind, AnthropicProvider, CostCalculator, ExecutionLog, GraphMirror, LearningSystem,
    LlmProvider, MemoryGraphMirror, NullGraphMirror, Orchestrator, TaskStore,
};
pub use storage::{ConfigService, Database, Settings};
pub use utils::error::{AppError, AppResult};
