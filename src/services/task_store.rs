//! Task Store
//!
//! CRUD plus status-filtered listing over the strategy task queue.
//! Listing order is (priority ASC, created_at DESC): most urgent first,
//! and among equal priority, newest first.

use std::collections::HashMap;

use rusqlite::params;

use crate::models::task::{Task, TaskCategory, TaskChanges, TaskStatus};
use crate::storage::database::{Database, DbPool};
use crate::utils::error::{AppError, AppResult};

/// Service for reading and mutating strategy tasks
#[derive(Clone)]
pub struct TaskStore {
    pool: DbPool,
}

impl TaskStore {
    /// Create a new task store over the given database
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

    /// Insert a new task
    pub fn create(&self, task: &Task) -> AppResult<()> {
        let conn = self.get_conn()?;
        let dependencies = serde_json::to_string(&task.dependencies)?;
        let tags = serde_json::to_string(&task.tags)?;
        let output = task
            .output_data
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        conn.execute(
            "INSERT INTO strategy_tasks
                 (id, title, description, category, priority, dependencies, agent_name,
                  status, progress, output_data, quality_score, tags,
                  created_at, updated_at, started_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                task.id,
                task.title,
                task.description,
                task.category.as_str(),
                task.priority,
                dependencies,
                task.agent_name,
                task.status.as_str(),
                task.progress,
                output,
                task.quality_score,
                tags,
                task.created_at,
                task.updated_at,
                task.started_at,
                task.completed_at,
            ],
        )?;
        Ok(())
    }

    /// Get a task by id
    pub fn get(&self, task_id: &str) -> AppResult<Option<Task>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            &format!("{} WHERE id = ?1", SELECT_TASK),
            params![task_id],
            Self::row_to_task,
        );

        match result {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::database(e.to_string())),
        }
    }

    /// List tasks with a given status, most urgent first and newest first
    /// among equal priority
    pub fn get_by_status(&self, status: TaskStatus) -> AppResult<Vec<Task>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE status = ?1 ORDER BY priority ASC, created_at DESC",
            SELECT_TASK
        ))?;

        let tasks = stmt
            .query_map(params![status.as_str()], Self::row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tasks)
    }

    /// Apply a partial update to a task. Fails with `NotFound` if the task
    /// does not exist; an empty change set is a validation error.
    pub fn update(&self, task_id: &str, changes: &TaskChanges) -> AppResult<()> {
        if changes.is_empty() {
            return Err(AppError::validation("No fields to update"));
        }

        let mut set_clauses: Vec<String> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(status) = changes.status {
            set_clauses.push(format!("status = ?{}", values.len() + 2));
            values.push(Box::new(status.as_str().to_string()));
        }
        if let Some(progress) = changes.progress {
            set_clauses.push(format!("progress = ?{}", values.len() + 2));
            values.push(Box::new(progress));
        }
        if let Some(ref output) = changes.output_data {
            set_clauses.push(format!("output_data = ?{}", values.len() + 2));
            values.push(Box::new(serde_json::to_string(output)?));
        }
        if let Some(score) = changes.quality_score {
            set_clauses.push(format!("quality_score = ?{}", values.len() + 2));
            values.push(Box::new(score));
        }
        if let Some(ref started_at) = changes.started_at {
            set_clauses.push(format!("started_at = ?{}", values.len() + 2));
            values.push(Box::new(started_at.clone()));
        }
        if let Some(ref completed_at) = changes.completed_at {
            set_clauses.push(format!("completed_at = ?{}", values.len() + 2));
            values.push(Box::new(completed_at.clone()));
        }

        set_clauses.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE strategy_tasks SET {} WHERE id = ?1",
            set_clauses.join(", ")
        );

        let conn = self.get_conn()?;
        let mut param_refs: Vec<&dyn rusqlite::ToSql> = vec![&task_id];
        for value in &values {
            param_refs.push(value.as_ref());
        }

        let affected = conn.execute(&sql, param_refs.as_slice())?;
        if affected == 0 {
            return Err(AppError::not_found(format!("Task not found: {}", task_id)));
        }
        Ok(())
    }

    /// Check whether a task exists
    pub fn exists(&self, task_id: &str) -> AppResult<bool> {
        let conn = self.get_conn()?;
        let result: Result<i64, _> = conn.query_row(
            "SELECT 1 FROM strategy_tasks WHERE id = ?1",
            params![task_id],
            |row| row.get(0),
        );
        match result {
            Ok(_) => Ok(true),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(false),
            Err(e) => Err(AppError::database(e.to_string())),
        }
    }

    /// Count tasks per status
    pub fn count_by_status(&self) -> AppResult<HashMap<String, i64>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT status, COUNT(*) FROM strategy_tasks GROUP BY status")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows.into_iter().collect())
    }

    fn row_to_task(row: &rusqlite::Row) -> rusqlite::Result<Task> {
        let category_str: String = row.get(3)?;
        let dependencies_json: String = row.get(5)?;
        let status_str: String = row.get(7)?;
        let output_json: Option<String> = row.get(9)?;
        let tags_json: String = row.get(11)?;

        let category: TaskCategory = category_str.parse().unwrap_or(TaskCategory::Content);
        let status: TaskStatus = status_str.parse().unwrap_or(TaskStatus::Backlog);
        let dependencies: Vec<String> =
            serde_json::from_str(&dependencies_json).unwrap_or_default();
        let tags: Vec<String> = serde_json::from_str(&tags_json).unwrap_or_default();
        let output_data = output_json.and_then(|s| serde_json::from_str(&s).ok());

        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            category,
            priority: row.get(4)?,
            dependencies,
            agent_name: row.get(6)?,
            status,
            progress: row.get(8)?,
            output_data,
            quality_score: row.get(10)?,
            tags,
            created_at: row.get(12)?,
            updated_at: row.get(13)?,
            started_at: row.get(14)?,
            completed_at: row.get(15)?,
        })
    }
}

const SELECT_TASK: &str = "SELECT id, title, description, category, priority, dependencies, \
     agent_name, status, progress, output_data, quality_score, tags, \
     created_at, updated_at, started_at, completed_at FROM strategy_tasks";

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (Database, TaskStore) {
        let db = Database::new_in_memory().unwrap();
        let store = TaskStore::new(&db);
        (db, store)
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let (_db, store) = store();
        let task = Task::new("Write blog post", TaskCategory::Content, 2)
            .with_agent("content_writer")
            .with_dependencies(vec!["other".to_string()]);
        store.create(&task).unwrap();

        let loaded = store.get(&task.id).unwrap().unwrap();
        assert_eq!(loaded.title, "Write blog post");
        assert_eq!(loaded.category, TaskCategory::Content);
        assert_eq!(loaded.dependencies, vec!["other".to_string()]);
        assert_eq!(loaded.status, TaskStatus::Backlog);
    }

    #[test]
    fn test_get_by_status_orders_by_priority_then_recency() {
        let (_db, store) = store();
        let low = Task::new("low", TaskCategory::Content, 3)
            .with_created_at("2025-07-01T10:00:00Z");
        let urgent_old = Task::new("urgent old", TaskCategory::Content, 1)
            .with_created_at("2025-07-01T08:00:00Z");
        let urgent_new = Task::new("urgent new", TaskCategory::Content, 1)
            .with_created_at("2025-07-01T09:00:00Z");
        store.create(&low).unwrap();
        store.create(&urgent_old).unwrap();
        store.create(&urgent_new).unwrap();

        let backlog = store.get_by_status(TaskStatus::Backlog).unwrap();
        let titles: Vec<&str> = backlog.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["urgent new", "urgent old", "low"]);
    }

    #[test]
    fn test_partial_update() {
        let (_db, store) = store();
        let task = Task::new("t", TaskCategory::Seo, 1);
        store.create(&task).unwrap();

        store
            .update(
                &task.id,
                &TaskChanges::status(TaskStatus::InProgress).progress(20),
            )
            .unwrap();

        let loaded = store.get(&task.id).unwrap().unwrap();
        assert_eq!(loaded.status, TaskStatus::InProgress);
        assert_eq!(loaded.progress, 20);
        // Untouched fields survive
        assert_eq!(loaded.title, "t");
    }

    #[test]
    fn test_update_missing_task_is_not_found() {
        let (_db, store) = store();
        let err = store
            .update("nope", &TaskChanges::status(TaskStatus::Done))
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_empty_update_rejected() {
        let (_db, store) = store();
        let err = store.update("any", &TaskChanges::default()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_count_by_status() {
        let (_db, store) = store();
        store
            .create(&Task::new("a", TaskCategory::Content, 1))
            .unwrap();
        store
            .create(&Task::new("b", TaskCategory::Content, 1))
            .unwrap();

        let counts = store.count_by_status().unwrap();
        assert_eq!(counts.get("backlog"), Some(&2));
        assert_eq!(counts.get("done"), None);
    }
}
