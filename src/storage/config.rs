//! JSON Configuration Management
//!
//! Handles reading and writing the application settings file
//! (~/.calor-strategy/config.json). Secrets are never persisted: the API
//! key is read from the environment at load time.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::utils::error::{AppError, AppResult};
use crate::utils::paths::{config_path, ensure_app_dir};

/// Environment variable carrying the Anthropic API key
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Default model for agents without a profile override
    #[serde(default = "default_model")]
    pub model: String,
    /// Default max output tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Default sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Override for the database location; defaults to the app directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,
    /// Whether the graph mirror sink is enabled
    #[serde(default)]
    pub mirror_enabled: bool,
    /// Maximum tasks per batch
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,
    /// Sleep between cycles in continuous mode, in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// API key, loaded from the environment; never written to disk
    #[serde(skip)]
    pub api_key: Option<String>,
}

fn default_model() -> String {
    "claude-sonnet-4-5-20250929".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    1.0
}

fn default_batch_limit() -> usize {
    5
}

fn default_poll_interval_secs() -> u64 {
    60
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            database_path: None,
            mirror_enabled: false,
            batch_limit: default_batch_limit(),
            poll_interval_secs: default_poll_interval_secs(),
            api_key: None,
        }
    }
}

impl Settings {
    /// Validate the settings
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Model cannot be empty".to_string());
        }
        if self.max_tokens == 0 {
            return Err("Max tokens must be positive".to_string());
        }
        if self.batch_limit == 0 {
            return Err("Batch limit must be positive".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("Temperature must be in [0.0, 2.0]".to_string());
        }
        Ok(())
    }
}

/// Configuration service for managing app settings
#[derive(Debug)]
pub struct ConfigService {
    config_path: PathBuf,
    settings: Settings,
}

impl ConfigService {
    /// Create a new config service, loading existing settings or creating defaults
    pub fn new() -> AppResult<Self> {
        ensure_app_dir()?;
        let config_path = config_path()?;
        Self::at(config_path)
    }

    /// Create a config service backed by an explicit file path
    pub fn at(config_path: PathBuf) -> AppResult<Self> {
        let mut settings = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let defaults = Settings::default();
            Self::save_to_file(&config_path, &defaults)?;
            defaults
        };

        settings.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());

        Ok(Self {
            config_path,
            settings,
        })
    }

    /// Load settings from a file
    fn load_from_file(path: &Path) -> AppResult<Settings> {
        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate().map_err(AppError::validation)?;
        Ok(settings)
    }

    /// Save settings to a file with pretty formatting
    fn save_to_file(path: &Path, settings: &Settings) -> AppResult<()> {
        settings.validate().map_err(AppError::validation)?;
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(settings)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Save the current settings to disk
    pub fn save(&self) -> AppResult<()> {
        Self::save_to_file(&self.config_path, &self.settings)
    }

    /// Reload settings from disk, re-reading the API key from the environment
    pub fn reload(&mut self) -> AppResult<()> {
        self.settings = Self::load_from_file(&self.config_path)?;
        self.settings.api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        Ok(())
    }
}
