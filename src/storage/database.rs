//! SQLite Database
//!
//! Embedded database for persistent storage using rusqlite with r2d2
//! connection pooling. Owns schema initialization and the seed data for
//! the built-in agent profiles.

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::database_path;

/// Type alias for the connection pool
pub type DbPool = Pool<SqliteConnectionManager>;

/// Database service for managing SQLite operations
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
}

/// Seed rows for the built-in agents. Inserted with `INSERT OR IGNORE` so
/// operator edits made through the approval workflow survive restarts.
fn default_agent_profiles() -> Vec<(&'static str, &'static str, &'static str, &'static str)> {
    vec![
        (
            "content_writer",
            "Content Writer",
            "Píše český obsah pro Calor: blogové články, stránky a návody o tepelných čerpadlech a fotovoltaice.",
            "Jsi zkušený obsahový redaktor společnosti Calor, dodavatele tepelných čerpadel a fotovoltaických systémů. Píšeš česky, věcně a srozumitelně pro majitele rodinných domů. Vždy vracíš validní JSON dle zadané struktury.",
        ),
        (
            "seo_specialist",
            "SEO Specialist",
            "Optimalizuje obsah a meta tagy pro český trh s vytápěním a solární energií.",
            "Jsi SEO expert zaměřený na český trh s vytápěním a fotovoltaikou. Navrhuješ klíčová slova, meta tagy a interní prolinkování. Vždy vracíš validní JSON dle zadané struktury.",
        ),
        (
            "product_manager",
            "Product Manager",
            "Vytváří produktové popisy a specifikace pro katalog tepelných čerpadel a FV sestav.",
            "Jsi produktový manažer společnosti Calor. Píšeš profesionální popisy produktů s důrazem na benefity a technické parametry. Vždy vracíš validní JSON dle zadané struktury.",
        ),
        (
            "marketing_copy",
            "Marketing Copywriter",
            "Píše konverzní marketingové texty, CTA a kampaně pro Calor.",
            "Jsi conversion copywriter společnosti Calor. Píšeš persuasivní české texty zaměřené na konverze, se silnými CTA a jasnou value proposition. Vždy vracíš validní JSON dle zadané struktury.",
        ),
    ]
}

impl Database {
    /// Create a database from an existing connection pool.
    pub fn from_pool(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create an in-memory database for testing.
    ///
    /// Uses an in-memory SQLite database with the same schema as the
    /// production database. Useful for integration and unit tests.
    pub fn new_in_memory() -> AppResult<Self> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;
        Ok(db)
    }

    /// Create a new database instance with connection pooling at the
    /// default location (~/.calor-strategy/strategy.db)
    pub fn new() -> AppResult<Self> {
        let db_path = database_path()?;
        Self::open(&db_path)
    }

    /// Open (or create) a database at an explicit path
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(10)
            .build(manager)
            .map_err(|e| AppError::database(format!("Failed to create connection pool: {}", e)))?;

        let db = Self { pool };
        db.init_schema()?;

        Ok(db)
    }

    /// Initialize the database schema
    fn init_schema(&self) -> AppResult<()> {
        let conn = self.get_connection()?;

        // Enable foreign keys (must be set per-connection in SQLite)
        conn.execute_batch("PRAGMA foreign_keys = ON")?;

        // Strategy tasks: the task queue with its status lifecycle
        conn.execute(
            "CREATE TABLE IF NOT EXISTS strategy_tasks (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT,
                category TEXT NOT NULL,
                priority INTEGER NOT NULL DEFAULT 5,
                dependencies TEXT NOT NULL DEFAULT '[]',
                agent_name TEXT,
                status TEXT NOT NULL DEFAULT 'backlog',
                progress INTEGER NOT NULL DEFAULT 0,
                output_data TEXT,
                quality_score REAL,
                tags TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                started_at TEXT,
                completed_at TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_strategy_tasks_status
             ON strategy_tasks(status)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_strategy_tasks_priority
             ON strategy_tasks(status, priority ASC, created_at DESC)",
            [],
        )?;

        // Agent profiles: per-agent prompt configuration and rolling stats
        conn.execute(
            "CREATE TABLE IF NOT EXISTS agent_profiles (
                agent_name TEXT PRIMARY KEY,
                display_name TEXT NOT NULL,
                description TEXT,
                system_prompt TEXT NOT NULL,
                model TEXT NOT NULL DEFAULT 'claude-sonnet-4-5-20250929',
                max_tokens INTEGER NOT NULL DEFAULT 4096,
                temperature REAL NOT NULL DEFAULT 1.0,
                tasks_completed INTEGER NOT NULL DEFAULT 0,
                avg_quality_score REAL,
                success_rate REAL,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        // Execution logs: append-only audit trail of agent invocations
        conn.execute(
            "CREATE TABLE IF NOT EXISTS execution_logs (
                id TEXT PRIMARY KEY,
                task_id TEXT NOT NULL,
                agent_name TEXT NOT NULL,
                execution_kind TEXT NOT NULL DEFAULT 'generation',
                trigger_source TEXT NOT NULL DEFAULT 'workflow',
                status TEXT NOT NULL,
                input_prompt TEXT,
                output_data TEXT,
                model_used TEXT NOT NULL DEFAULT '',
                input_tokens INTEGER NOT NULL DEFAULT 0,
                output_tokens INTEGER NOT NULL DEFAULT 0,
                cost_microdollars INTEGER NOT NULL DEFAULT 0,
                quality_score REAL,
                error_message TEXT,
                started_at TEXT NOT NULL,
                completed_at TEXT,
                duration_ms INTEGER,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                FOREIGN KEY (task_id) REFERENCES strategy_tasks(id),
                FOREIGN KEY (agent_name) REFERENCES agent_profiles(agent_name)
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_execution_logs_task_id
             ON execution_logs(task_id, created_at)",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_execution_logs_agent
             ON execution_logs(agent_name)",
            [],
        )?;

        self.seed_agent_profiles(&conn)?;

        Ok(())
    }

    /// Insert the built-in agent profiles if they are not present yet
    fn seed_agent_profiles(&self, conn: &rusqlite::Connection) -> AppResult<()> {
        for (name, display_name, description, system_prompt) in default_agent_profiles() {
            conn.execute(
                "INSERT OR IGNORE INTO agent_profiles
                     (agent_name, display_name, description, system_prompt)
                 VALUES (?1, ?2, ?3, ?4)",
                params![name, display_name, description, system_prompt],
            )?;
        }
        Ok(())
    }

    /// Get a connection from the pool
    pub fn get_connection(&self) -> AppResult<r2d2::PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| AppError::database(format!("Failed to get connection: {}", e)))
    }

    /// Get the connection pool
    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Check if the database is healthy
    pub fn is_healthy(&self) -> bool {
        if let Ok(conn) = self.pool.get() {
            conn.query_row("SELECT 1", [], |_| Ok(())).is_ok()
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_schema_and_seed() {
        let db = Database::new_in_memory().unwrap();
        assert!(db.is_healthy());

        let conn = db.get_connection().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM agent_profiles", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 4);
    }

    #[test]
    fn test_seed_is_idempotent() {
        let db = Database::new_in_memory().unwrap();
        let conn = db.get_connection().unwrap();
        db.seed_agent_profiles(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM agent_profiles", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 4);
    }
}
