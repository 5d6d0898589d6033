//! Application state shared across handlers.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::db::DbPool;
use crate::engine::PolicyCache;
use crate::srs::StudySession;

/// Per-learner study sessions (reinforcement queues), in-memory only
pub type SessionMap = Arc<Mutex<HashMap<i64, StudySession>>>;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared database connection
    pub pool: DbPool,

    /// TTL cache over deck policy reads
    pub policy_cache: Arc<PolicyCache>,

    /// Active study sessions keyed by learner id
    pub sessions: SessionMap,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            policy_cache: Arc::new(PolicyCache::default()),
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}
