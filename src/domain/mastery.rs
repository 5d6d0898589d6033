use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_EASE_FACTOR;

/// Categorical summary of how well a learner knows a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
  New,
  Learning,
  Review,
  Mastered,
}

impl MasteryLevel {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::New => "new",
      Self::Learning => "learning",
      Self::Review => "review",
      Self::Mastered => "mastered",
    }
  }

  pub fn from_str(s: &str) -> Self {
    match s {
      "learning" => Self::Learning,
      "review" => Self::Review,
      "mastered" => Self::Mastered,
      _ => Self::New,
    }
  }
}

/// Per (learner, card) scheduling aggregate.
///
/// One row per pair, created lazily on the first review and rewritten in
/// full by each subsequent review transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryState {
  pub learner_id: i64,
  pub card_id: i64,
  /// 0-100; tie breaker when ordering the due queue
  pub confidence_score: u8,
  pub level: MasteryLevel,
  /// Consecutive correct reviews since the last reset
  pub streak: i64,
  pub total_attempts: i64,
  pub successful_attempts: i64,
  pub interval_days: i64,
  pub ease_factor: f64,
  pub last_reviewed_at: DateTime<Utc>,
  pub next_due_at: DateTime<Utc>,
}

impl MasteryState {
  /// Fresh state for a never-reviewed (learner, card) pair.
  /// Due immediately, interval 1 day, default easiness.
  pub fn new(learner_id: i64, card_id: i64, now: DateTime<Utc>) -> Self {
    Self {
      learner_id,
      card_id,
      confidence_score: 0,
      level: MasteryLevel::New,
      streak: 0,
      total_attempts: 0,
      successful_attempts: 0,
      interval_days: 1,
      ease_factor: DEFAULT_EASE_FACTOR,
      last_reviewed_at: now,
      next_due_at: now,
    }
  }

  /// Level as observed at `now`.
  ///
  /// A mastered card whose due date has passed reads as `review` without
  /// any stored mutation; the next review outcome resolves it.
  pub fn effective_level(&self, now: DateTime<Utc>) -> MasteryLevel {
    if self.level == MasteryLevel::Mastered && self.next_due_at <= now {
      MasteryLevel::Review
    } else {
      self.level
    }
  }

  pub fn success_rate(&self) -> f64 {
    if self.total_attempts > 0 {
      self.successful_attempts as f64 / self.total_attempts as f64
    } else {
      0.0
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Duration;

  #[test]
  fn test_level_from_str_roundtrip() {
    let levels = [
      MasteryLevel::New,
      MasteryLevel::Learning,
      MasteryLevel::Review,
      MasteryLevel::Mastered,
    ];

    for level in levels {
      assert_eq!(MasteryLevel::from_str(level.as_str()), level);
    }
  }

  #[test]
  fn test_level_from_str_default() {
    // Unknown strings default to New
    assert_eq!(MasteryLevel::from_str("unknown"), MasteryLevel::New);
    assert_eq!(MasteryLevel::from_str(""), MasteryLevel::New);
  }

  #[test]
  fn test_new_state_defaults() {
    let now = Utc::now();
    let state = MasteryState::new(1, 42, now);

    assert_eq!(state.learner_id, 1);
    assert_eq!(state.card_id, 42);
    assert_eq!(state.confidence_score, 0);
    assert_eq!(state.level, MasteryLevel::New);
    assert_eq!(state.streak, 0);
    assert_eq!(state.total_attempts, 0);
    assert_eq!(state.successful_attempts, 0);
    assert_eq!(state.interval_days, 1);
    assert!((state.ease_factor - 2.5).abs() < f64::EPSILON);
    assert_eq!(state.next_due_at, now);
  }

  #[test]
  fn test_effective_level_demotes_overdue_mastered() {
    let now = Utc::now();
    let mut state = MasteryState::new(1, 42, now);
    state.level = MasteryLevel::Mastered;
    state.next_due_at = now - Duration::hours(1);

    assert_eq!(state.effective_level(now), MasteryLevel::Review);
    // Stored level is untouched
    assert_eq!(state.level, MasteryLevel::Mastered);
  }

  #[test]
  fn test_effective_level_keeps_future_mastered() {
    let now = Utc::now();
    let mut state = MasteryState::new(1, 42, now);
    state.level = MasteryLevel::Mastered;
    state.next_due_at = now + Duration::days(3);

    assert_eq!(state.effective_level(now), MasteryLevel::Mastered);
  }

  #[test]
  fn test_effective_level_never_demotes_learning() {
    let now = Utc::now();
    let mut state = MasteryState::new(1, 42, now);
    state.level = MasteryLevel::Learning;
    state.next_due_at = now - Duration::days(2);

    assert_eq!(state.effective_level(now), MasteryLevel::Learning);
  }

  #[test]
  fn test_success_rate() {
    let now = Utc::now();
    let mut state = MasteryState::new(1, 42, now);
    assert_eq!(state.success_rate(), 0.0);

    state.total_attempts = 4;
    state.successful_attempts = 3;
    assert!((state.success_rate() - 0.75).abs() < f64::EPSILON);
  }
}
