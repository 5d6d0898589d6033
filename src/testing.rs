//! Test utilities for database setup.
//!
//! Provides helpers that reuse authoritative schema initialization,
//! eliminating schema duplication in test code.

use tempfile::TempDir;

use crate::db::{self, DbPool};

/// Test environment backed by a temporary on-disk database initialized
/// with the authoritative schema. The directory is cleaned up on drop.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Pool over the initialized database
    pub pool: DbPool,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let pool = db::init_db(&temp.path().join("mastery.db"))?;
        Ok(Self { temp, pool })
    }

    /// Seed one learner, one deck, and one card; returns their ids.
    pub fn seed_basic(&self) -> rusqlite::Result<(i64, i64, i64)> {
        let conn = self.pool.lock().expect("test db lock");
        let learner = db::insert_learner(&conn, "test-learner")?;
        let deck = db::insert_deck(&conn, "test-deck")?;
        let card = db::insert_card(&conn, deck, "front", "back")?;
        Ok((learner, deck, card))
    }
}
