//! Application configuration constants.
//!
//! This module centralizes the scheduler tuning values and the runtime
//! configuration (database path, bind address) in one place.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Database Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

/// Load database path with priority: config.toml > .env > default
pub fn load_database_path() -> PathBuf {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    // Priority 1: config.toml
    if let Ok(contents) = std::fs::read_to_string("config.toml") {
        if let Ok(config) = toml::from_str::<AppConfig>(&contents) {
            if let Some(db) = config.database {
                if let Some(path) = db.path {
                    tracing::info!("Using database from config.toml: {}", path);
                    return PathBuf::from(path);
                }
            }
        }
    }

    // Priority 2: .env DATABASE_PATH
    if let Ok(path) = std::env::var("DATABASE_PATH") {
        tracing::info!("Using database from DATABASE_PATH env: {}", path);
        return PathBuf::from(path);
    }

    // Default
    let default = PathBuf::from("data/mastery.db");
    tracing::info!("Using default database path: {}", default.display());
    default
}

// ==================== Server Configuration ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

/// Get the full server bind address
pub fn server_bind_addr() -> String {
    format!("{}:{}", SERVER_ADDR, SERVER_PORT)
}

// ==================== Scheduler Configuration ====================

/// Easiness factor assigned to a card's first mastery state
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Easiness factor never drops below this floor
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Easiness factor never grows above this ceiling
pub const MAX_EASE_FACTOR: f64 = 3.0;

/// Added to the easiness factor after a correct answer
pub const EASE_GAIN: f64 = 0.1;

/// Subtracted from the easiness factor after a wrong answer when the
/// deck policy does not reset the streak
pub const EASE_PENALTY: f64 = 0.2;

/// Fixed intervals (days) for the first successful repetitions, keyed by
/// streak. After the table is exhausted the multiplicative phase takes
/// over: max(1, round(interval * ease)).
pub const EARLY_INTERVALS: [i64; 3] = [1, 3, 7];

/// Confidence score movement per outcome (clamped to 0..=100).
/// Failures sink the score faster than successes climb it.
pub const CONFIDENCE_GAIN: i64 = 8;
pub const CONFIDENCE_PENALTY: i64 = 15;

// ==================== Policy Cache ====================

/// How long a cached deck policy stays fresh
pub const POLICY_CACHE_TTL_SECS: u64 = 60;

// ==================== Query Limits ====================

/// Default limit for due-card queries when the caller gives none
pub const DEFAULT_DUE_LIMIT: usize = 50;
