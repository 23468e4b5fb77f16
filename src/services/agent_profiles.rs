//! Agent Profile Store
//!
//! Reads the stored per-agent configuration used to build the agent
//! registry. Profiles are seeded at schema init and edited out-of-band by
//! the approval workflow; the orchestrator only reads them.

use rusqlite::params;

use crate::models::agent::AgentProfile;
use crate::storage::database::{Database, DbPool};
use crate::utils::error::{AppError, AppResult};

/// Service for reading agent profiles
#[derive(Clone)]
pub struct AgentProfileStore {
    pool: DbPool,
}

impl AgentProfileStore {
    /// Create a new profile store over the given database
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

    /// Get an active profile by agent name
    pub fn get(&self, agent_name: &str) -> AppResult<Option<AgentProfile>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            &format!("{} WHERE agent_name = ?1 AND active = 1", SELECT_PROFILE),
            params![agent_name],
            Self::row_to_profile,
        );

        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(AppError::database(e.to_string())),
        }
    }

    /// List all active profiles, ordered by name
    pub fn list_active(&self) -> AppResult<Vec<AgentProfile>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE active = 1 ORDER BY agent_name ASC",
            SELECT_PROFILE
        ))?;

        let profiles = stmt
            .query_map([], Self::row_to_profile)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(profiles)
    }

    /// Check whether an active profile exists
    pub fn exists(&self, agent_name: &str) -> AppResult<bool> {
        Ok(self.get(agent_name)?.is_some())
    }

    fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<AgentProfile> {
        let active: i64 = row.get(10)?;
        Ok(AgentProfile {
            agent_name: row.get(0)?,
            display_name: row.get(1)?,
            description: row.get(2)?,
            system_prompt: row.get(3)?,
            model: row.get(4)?,
            max_tokens: row.get::<_, i64>(5)? as u32,
            temperature: row.get::<_, f64>(6)? as f32,
            tasks_completed: row.get(7)?,
            avg_quality_score: row.get(8)?,
            success_rate: row.get(9)?,
            active: active != 0,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }
}

const SELECT_PROFILE: &str = "SELECT agent_name, display_name, description, system_prompt, model, \
     max_tokens, temperature, tasks_completed, avg_quality_score, success_rate, active, \
     created_at, updated_at FROM agent_profiles";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_profiles_load() {
        let db = Database::new_in_memory().unwrap();
        let store = AgentProfileStore::new(&db);

        let profile = store.get("content_writer").unwrap().unwrap();
        assert_eq!(profile.display_name, "Content Writer");
        assert!(profile.active);
        assert!(profile.validate().is_ok());

        assert!(store.get("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_list_active_covers_all_seeds() {
        let db = Database::new_in_memory().unwrap();
        let store = AgentProfileStore::new(&db);

        let profiles = store.list_active().unwrap();
        let names: Vec<&str> = profiles.iter().map(|p| p.agent_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "content_writer",
                "marketing_copy",
                "product_manager",
                "seo_specialist"
            ]
        );
    }

    #[test]
    fn test_inactive_profiles_hidden() {
        let db = Database::new_in_memory().unwrap();
        let conn = db.get_connection().unwrap();
        conn.execute(
            "UPDATE agent_profiles SET active = 0 WHERE agent_name = 'seo_specialist'",
            [],
        )
        .unwrap();

        let store = AgentProfileStore::new(&db);
        assert!(!store.exists("seo_specialist").unwrap());
        assert_eq!(store.list_active().unwrap().len(), 3);
    }
}
