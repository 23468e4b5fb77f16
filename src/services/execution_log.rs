//! Execution Log
//!
//! Append-only audit trail of agent invocation attempts. The store exposes
//! no update or delete; a record that references a missing task or agent
//! is rejected at append time.

use rusqlite::params;

use crate::models::execution::{
    ExecutionKind, ExecutionRecord, ExecutionStatus, TriggerSource,
};
use crate::storage::database::{Database, DbPool};
use crate::utils::error::{AppError, AppResult};

/// Order for per-task queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOrder {
    OldestFirst,
    NewestFirst,
}

/// Aggregate execution statistics for one agent
#[derive(Debug, Clone, Default)]
pub struct AgentLogStats {
    pub executions: i64,
    pub successful: i64,
    pub avg_quality: Option<f64>,
    pub total_tokens: i64,
    pub total_cost_microdollars: i64,
}

/// Service for the append-only execution log
#[derive(Clone)]
pub struct ExecutionLog {
    pool: DbPool,
}

impl ExecutionLog {
    /// Create a new execution log over the given database
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    fn get_conn(&self) -> AppResult<r2d2::PooledConnection<r2d2_sqlite::SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Append a record and return its id.
    ///
    /// Fails if the referenced task or agent does not exist.
    pub fn append(&self, record: &ExecutionRecord) -> AppResult<String> {
        let conn = self.get_conn()?;

        let task_exists: Result<i64, _> = conn.query_row(
            "SELECT 1 FROM strategy_tasks WHERE id = ?1",
            params![record.task_id],
            |row| row.get(0),
        );
        if matches!(task_exists, Err(rusqlite::Error::QueryReturnedNoRows)) {
            return Err(AppError::not_found(format!(
                "Task not found: {}",
                record.task_id
            )));
        }

        let agent_exists: Result<i64, _> = conn.query_row(
            "SELECT 1 FROM agent_profiles WHERE agent_name = ?1",
            params![record.agent_name],
            |row| row.get(0),
        );
        if matches!(agent_exists, Err(rusqlite::Error::QueryReturnedNoRows)) {
            return Err(AppError::not_found(format!(
                "Agent not found: {}",
                record.agent_name
            )));
        }

        let output = record
            .output_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            "INSERT INTO execution_logs
                 (id, task_id, agent_name, execution_kind, trigger_source, status,
                  input_prompt, output_data, model_used, input_tokens, output_tokens,
                  cost_microdollars, quality_score, error_message,
                  started_at, completed_at, duration_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                record.id,
                record.task_id,
                record.agent_name,
                record.kind.as_str(),
                record.trigger.as_str(),
                record.status.as_str(),
                record.input_prompt,
                output,
                record.model_used,
                record.input_tokens,
                record.output_tokens,
                record.cost_microdollars,
                record.quality_score,
                record.error_message,
                record.started_at,
                record.completed_at,
                record.duration_ms,
            ],
        )?;

        Ok(record.id.clone())
    }

    /// All records for a task in the requested order
    pub fn for_task(&self, task_id: &str, order: LogOrder) -> AppResult<Vec<ExecutionRecord>> {
        let direction = match order {
            LogOrder::OldestFirst => "ASC",
            LogOrder::NewestFirst => "DESC",
        };

        let conn = self.get_conn()?;
        // rowid breaks ties for records created within the same second
        let mut stmt = conn.prepare(&format!(
            "{} WHERE task_id = ?1 ORDER BY created_at {}, rowid {}",
            SELECT_RECORD, direction, direction
        ))?;

        let records = stmt
            .query_map(params![task_id], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Aggregate statistics for one agent
    pub fn agent_stats(&self, agent_name: &str) -> AppResult<AgentLogStats> {
        let conn = self.get_conn()?;
        let stats = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN status = 'success' THEN 1 ELSE 0 END), 0),
                    AVG(quality_score),
                    COALESCE(SUM(input_tokens + output_tokens), 0),
                    COALESCE(SUM(cost_microdollars), 0)
             FROM execution_logs WHERE agent_name = ?1",
            params![agent_name],
            |row| {
                Ok(AgentLogStats {
                    executions: row.get(0)?,
                    successful: row.get(1)?,
                    avg_quality: row.get(2)?,
                    total_tokens: row.get(3)?,
                    total_cost_microdollars: row.get(4)?,
                })
            },
        )?;
        Ok(stats)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<ExecutionRecord> {
        let kind_str: String = row.get(3)?;
        let trigger_str: String = row.get(4)?;
        let status_str: String = row.get(5)?;
        let output_json: Option<String> = row.get(7)?;

        Ok(ExecutionRecord {
            id: row.get(0)?,
            task_id: row.get(1)?,
            agent_name: row.get(2)?,
            kind: kind_str.parse().unwrap_or(ExecutionKind::Generation),
            trigger: trigger_str.parse().unwrap_or(TriggerSource::Workflow),
            status: status_str.parse().unwrap_or(ExecutionStatus::Failed),
            input_prompt: row.get(6)?,
            output_data: output_json.and_then(|s| serde_json::from_str(&s).ok()),
            model_used: row.get(8)?,
            input_tokens: row.get(9)?,
            output_tokens: row.get(10)?,
            cost_microdollars: row.get(11)?,
            quality_score: row.get(12)?,
            error_message: row.get(13)?,
            started_at: row.get(14)?,
            completed_at: row.get(15)?,
            duration_ms: row.get(16)?,
        })
    }
}

const SELECT_RECORD: &str = "SELECT id, task_id, agent_name, execution_kind, trigger_source, \
     status, input_prompt, output_data, model_used, input_tokens, output_tokens, \
     cost_microdollars, quality_score, error_message, started_at, completed_at, duration_ms \
     FROM execution_logs";
