//! Storage Layer
//!
//! SQLite database and JSON settings.

pub mod config;
pub mod database;

pub use config::{ConfigService, Settings};
pub use database::{Database, DbPool};
