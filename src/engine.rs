//! Engine operations: the calling layer's entry points.
//!
//! `record_review` is the only write path for mastery state. It runs as
//! one IMMEDIATE transaction so the event insert and the state update
//! land together or not at all.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::config::POLICY_CACHE_TTL_SECS;
use crate::db;
use crate::domain::{
  DeckLearningPolicy, MasteryLevel, MasteryState, Outcome, PolicyUpdate, ReviewEvent, StudyMode,
};
use crate::error::{EngineError, EngineResult};
use crate::srs;

/// One answer submission.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ReviewRequest {
  pub learner_id: i64,
  pub card_id: i64,
  pub outcome: Outcome,
  pub study_mode: StudyMode,
  pub confidence_before: Option<i64>,
  pub confidence_after: Option<i64>,
  pub response_time_ms: Option<i64>,
}

/// What the caller gets back after a review is applied.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ReviewSummary {
  pub mastery_level: MasteryLevel,
  pub next_due_at: DateTime<Utc>,
  pub confidence_score: u8,
  pub interval_days: i64,
  pub streak: i64,
}

/// Record one answer attempt and reschedule the card.
///
/// Persists the immutable review event and the updated mastery state in
/// a single transaction; on any error nothing is written.
pub fn record_review(
  conn: &mut Connection,
  cache: &PolicyCache,
  req: &ReviewRequest,
  now: DateTime<Utc>,
) -> EngineResult<ReviewSummary> {
  let confidence_before = validate_confidence(req.confidence_before, "confidence_before")?;
  let confidence_after = validate_confidence(req.confidence_after, "confidence_after")?;

  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  if !db::learner_exists(&tx, req.learner_id)? {
    return Err(EngineError::not_found(format!("learner {}", req.learner_id)));
  }
  let deck_id = db::get_card_deck(&tx, req.card_id)?
    .ok_or_else(|| EngineError::not_found(format!("card {}", req.card_id)))?;

  let policy = cache.get(&tx, deck_id)?;

  let state = db::get_mastery_state(&tx, req.learner_id, req.card_id)?
    .unwrap_or_else(|| MasteryState::new(req.learner_id, req.card_id, now));

  let mut next = srs::apply_outcome(&state, req.outcome, &policy, now);
  // A self-reported confidence takes precedence over the computed nudge
  if let Some(reported) = confidence_after {
    next.confidence_score = reported;
  }

  let event = ReviewEvent {
    id: 0,
    learner_id: req.learner_id,
    card_id: req.card_id,
    reviewed_at: now,
    outcome: req.outcome,
    study_mode: req.study_mode,
    confidence_before,
    confidence_after,
    response_time_ms: req.response_time_ms,
  };
  db::insert_review_event(&tx, &event)?;
  db::upsert_mastery_state(&tx, &next)?;

  tx.commit()?;

  tracing::debug!(
    learner_id = req.learner_id,
    card_id = req.card_id,
    outcome = req.outcome.as_str(),
    level = next.level.as_str(),
    interval_days = next.interval_days,
    "review recorded"
  );

  Ok(ReviewSummary {
    mastery_level: next.level,
    next_due_at: next.next_due_at,
    confidence_score: next.confidence_score,
    interval_days: next.interval_days,
    streak: next.streak,
  })
}

/// Due card ids for a learner, most overdue first.
pub fn get_due_cards(
  conn: &Connection,
  learner_id: i64,
  deck_id: Option<i64>,
  limit: Option<usize>,
  now: DateTime<Utc>,
) -> EngineResult<Vec<i64>> {
  let states = get_due_states(conn, learner_id, deck_id, limit, now)?;
  Ok(states.into_iter().map(|s| s.card_id).collect())
}

/// Full due rows, for callers that need more than the ids
/// (session selection, API responses).
pub fn get_due_states(
  conn: &Connection,
  learner_id: i64,
  deck_id: Option<i64>,
  limit: Option<usize>,
  now: DateTime<Utc>,
) -> EngineResult<Vec<MasteryState>> {
  if !db::learner_exists(conn, learner_id)? {
    return Err(EngineError::not_found(format!("learner {}", learner_id)));
  }
  if let Some(deck_id) = deck_id {
    if !db::deck_exists(conn, deck_id)? {
      return Err(EngineError::not_found(format!("deck {}", deck_id)));
    }
  }
  Ok(db::get_due_states(conn, learner_id, deck_id, limit, now)?)
}

/// Deck policy with defaults when unset.
pub fn get_policy(conn: &Connection, deck_id: i64) -> EngineResult<DeckLearningPolicy> {
  if !db::deck_exists(conn, deck_id)? {
    return Err(EngineError::not_found(format!("deck {}", deck_id)));
  }
  Ok(db::get_policy(conn, deck_id)?)
}

/// Validated partial policy update; invalidates the cache entry.
pub fn update_policy(
  conn: &Connection,
  cache: &PolicyCache,
  deck_id: i64,
  update: &PolicyUpdate,
) -> EngineResult<DeckLearningPolicy> {
  if !db::deck_exists(conn, deck_id)? {
    return Err(EngineError::not_found(format!("deck {}", deck_id)));
  }
  let next = update.apply(db::get_policy(conn, deck_id)?)?;
  db::set_policy(conn, deck_id, &next)?;
  cache.invalidate(deck_id);
  Ok(next)
}

fn validate_confidence(value: Option<i64>, field: &str) -> EngineResult<Option<u8>> {
  match value {
    None => Ok(None),
    Some(v) if (0..=100).contains(&v) => Ok(Some(v as u8)),
    Some(v) => Err(EngineError::validation(format!(
      "{} must be between 0 and 100, got {}",
      field, v
    ))),
  }
}

/// Explicit TTL cache over deck policy reads.
///
/// Policies are read on every review but change rarely; `update_policy`
/// invalidates the entry so a stale policy outlives a write by at most
/// one in-flight read.
pub struct PolicyCache {
  ttl: Duration,
  entries: Mutex<HashMap<i64, (Instant, DeckLearningPolicy)>>,
}

impl PolicyCache {
  pub fn new(ttl: Duration) -> Self {
    Self {
      ttl,
      entries: Mutex::new(HashMap::new()),
    }
  }

  pub fn get(&self, conn: &Connection, deck_id: i64) -> EngineResult<DeckLearningPolicy> {
    {
      let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
      if let Some((cached_at, policy)) = entries.get(&deck_id) {
        if cached_at.elapsed() < self.ttl {
          return Ok(*policy);
        }
      }
    }

    let policy = db::get_policy(conn, deck_id)?;
    let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    entries.insert(deck_id, (Instant::now(), policy));
    Ok(policy)
  }

  pub fn invalidate(&self, deck_id: i64) {
    let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    entries.remove(&deck_id);
  }
}

impl Default for PolicyCache {
  fn default() -> Self {
    Self::new(Duration::from_secs(POLICY_CACHE_TTL_SECS))
  }
}
