//! Interval scheduler: pure outcome application over mastery state.
//!
//! SM-2 style model. Correct answers grow the easiness factor and the
//! interval (fixed 1/3/7 day table for the first repetitions, then
//! multiplicative); wrong answers either reset the streak and interval
//! or only penalize the easiness factor, per deck policy.

use chrono::{DateTime, Duration, Utc};

use crate::config::{
  CONFIDENCE_GAIN, CONFIDENCE_PENALTY, EARLY_INTERVALS, EASE_GAIN, EASE_PENALTY, MAX_EASE_FACTOR,
  MIN_EASE_FACTOR,
};
use crate::domain::{DeckLearningPolicy, MasteryLevel, MasteryState, Outcome};

/// Apply one review outcome to a mastery state.
///
/// Pure function: the same (state, outcome, policy, now) tuple always
/// produces the same result, and the input state is untouched. The
/// caller persists the returned state.
pub fn apply_outcome(
  state: &MasteryState,
  outcome: Outcome,
  policy: &DeckLearningPolicy,
  now: DateTime<Utc>,
) -> MasteryState {
  let mut next = state.clone();

  match outcome {
    Outcome::Correct => {
      next.streak += 1;
      next.successful_attempts += 1;
      next.ease_factor = (next.ease_factor + EASE_GAIN).min(MAX_EASE_FACTOR);
      next.interval_days = next_interval(next.streak, state.interval_days, next.ease_factor);
      next.confidence_score = bump_confidence(state.confidence_score, CONFIDENCE_GAIN);
    }
    Outcome::Incorrect => {
      if policy.reset_on_wrong_answer {
        next.streak = 0;
        next.interval_days = 1;
      } else {
        next.ease_factor = (next.ease_factor - EASE_PENALTY).max(MIN_EASE_FACTOR);
      }
      next.confidence_score = bump_confidence(state.confidence_score, -CONFIDENCE_PENALTY);
    }
  }

  next.total_attempts += 1;
  next.last_reviewed_at = now;
  next.next_due_at = now + Duration::days(next.interval_days);
  next.level = level_for(&next, policy);

  next
}

/// Interval for a given streak: fixed table for the early repetitions,
/// multiplicative afterwards.
fn next_interval(streak: i64, current_interval: i64, ease_factor: f64) -> i64 {
  match streak {
    s if s >= 1 && (s as usize) <= EARLY_INTERVALS.len() => EARLY_INTERVALS[(s - 1) as usize],
    _ => ((current_interval as f64) * ease_factor).round().max(1.0) as i64,
  }
}

/// Mastery level as a pure function of the post-update counters.
fn level_for(state: &MasteryState, policy: &DeckLearningPolicy) -> MasteryLevel {
  if state.total_attempts == 0 {
    MasteryLevel::New
  } else if state.streak < policy.required_correct_to_learn {
    MasteryLevel::Learning
  } else if policy.auto_mark_learned {
    MasteryLevel::Mastered
  } else {
    MasteryLevel::Review
  }
}

fn bump_confidence(current: u8, delta: i64) -> u8 {
  (current as i64 + delta).clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fresh(now: DateTime<Utc>) -> MasteryState {
    MasteryState::new(1, 42, now)
  }

  fn reset_policy() -> DeckLearningPolicy {
    DeckLearningPolicy {
      required_correct_to_learn: 3,
      auto_mark_learned: true,
      reset_on_wrong_answer: true,
    }
  }

  #[test]
  fn test_first_correct_review() {
    let now = Utc::now();
    let result = apply_outcome(&fresh(now), Outcome::Correct, &Default::default(), now);

    assert_eq!(result.streak, 1);
    assert_eq!(result.total_attempts, 1);
    assert_eq!(result.successful_attempts, 1);
    assert_eq!(result.interval_days, 1);
    assert_eq!(result.level, MasteryLevel::Learning);
    assert!((result.ease_factor - 2.6).abs() < 0.001);
    assert_eq!(result.next_due_at, now + Duration::days(1));
  }

  #[test]
  fn test_early_interval_table() {
    let now = Utc::now();
    let policy = DeckLearningPolicy::default();
    let mut state = fresh(now);

    let expected = [1, 3, 7];
    for days in expected {
      state = apply_outcome(&state, Outcome::Correct, &policy, now);
      assert_eq!(state.interval_days, days);
    }
  }

  #[test]
  fn test_multiplicative_phase_after_table() {
    let now = Utc::now();
    let policy = DeckLearningPolicy::default();
    let mut state = fresh(now);

    for _ in 0..3 {
      state = apply_outcome(&state, Outcome::Correct, &policy, now);
    }
    // Fourth success leaves the table: round(7 * ease)
    let before = state.clone();
    state = apply_outcome(&state, Outcome::Correct, &policy, now);

    let expected = ((before.interval_days as f64) * state.ease_factor).round() as i64;
    assert_eq!(state.interval_days, expected);
    assert!(state.interval_days > 7);
  }

  #[test]
  fn test_interval_never_below_one_day() {
    let now = Utc::now();
    let policy = DeckLearningPolicy::default();
    let mut state = fresh(now);
    state.streak = 10;
    state.interval_days = 0;
    state.ease_factor = MIN_EASE_FACTOR;

    let result = apply_outcome(&state, Outcome::Correct, &policy, now);
    assert!(result.interval_days >= 1);
  }

  #[test]
  fn test_ease_factor_ceiling() {
    let now = Utc::now();
    let policy = DeckLearningPolicy::default();
    let mut state = fresh(now);

    for _ in 0..20 {
      state = apply_outcome(&state, Outcome::Correct, &policy, now);
    }
    assert!(state.ease_factor <= MAX_EASE_FACTOR + f64::EPSILON);
  }

  #[test]
  fn test_ease_factor_floor() {
    let now = Utc::now();
    let policy = DeckLearningPolicy::default(); // no reset, so ease is penalized
    let mut state = fresh(now);

    for _ in 0..20 {
      state = apply_outcome(&state, Outcome::Incorrect, &policy, now);
    }
    assert!(state.ease_factor >= MIN_EASE_FACTOR - f64::EPSILON);
    assert!((state.ease_factor - MIN_EASE_FACTOR).abs() < 0.001);
  }

  #[test]
  fn test_three_correct_reach_mastered() {
    // Scenario: {required_correct_to_learn=3, reset_on_wrong_answer=true},
    // three correct reviews on a fresh card
    let now = Utc::now();
    let policy = reset_policy();
    let mut state = fresh(now);

    for _ in 0..3 {
      state = apply_outcome(&state, Outcome::Correct, &policy, now);
    }

    assert_eq!(state.level, MasteryLevel::Mastered);
    assert_eq!(state.streak, 3);
  }

  #[test]
  fn test_wrong_answer_resets_streak_and_interval() {
    // Scenario: two correct then one incorrect with reset_on_wrong_answer
    let now = Utc::now();
    let policy = reset_policy();
    let mut state = fresh(now);

    state = apply_outcome(&state, Outcome::Correct, &policy, now);
    state = apply_outcome(&state, Outcome::Correct, &policy, now);
    state = apply_outcome(&state, Outcome::Incorrect, &policy, now);

    assert_eq!(state.streak, 0);
    assert_eq!(state.interval_days, 1);
    assert_eq!(state.level, MasteryLevel::Learning);
    assert_eq!(state.next_due_at, now + Duration::days(1));
  }

  #[test]
  fn test_wrong_answer_without_reset_keeps_streak() {
    // Scenario: two correct then one incorrect with reset disabled
    let now = Utc::now();
    let policy = DeckLearningPolicy::default();
    let mut state = fresh(now);

    state = apply_outcome(&state, Outcome::Correct, &policy, now);
    state = apply_outcome(&state, Outcome::Correct, &policy, now);
    let ease_before = state.ease_factor;
    state = apply_outcome(&state, Outcome::Incorrect, &policy, now);

    assert_eq!(state.streak, 2);
    assert!((state.ease_factor - (ease_before - EASE_PENALTY)).abs() < 0.001);
    assert!(state.ease_factor >= MIN_EASE_FACTOR);
  }

  #[test]
  fn test_mastered_stays_until_reset_failure() {
    let now = Utc::now();
    let policy = reset_policy();
    let mut state = fresh(now);

    for _ in 0..5 {
      state = apply_outcome(&state, Outcome::Correct, &policy, now);
      if state.streak >= policy.required_correct_to_learn {
        assert_eq!(state.level, MasteryLevel::Mastered);
      }
    }

    state = apply_outcome(&state, Outcome::Incorrect, &policy, now);
    assert_eq!(state.level, MasteryLevel::Learning);
  }

  #[test]
  fn test_no_auto_mark_learned_gives_review() {
    let now = Utc::now();
    let policy = DeckLearningPolicy {
      auto_mark_learned: false,
      ..Default::default()
    };
    let mut state = fresh(now);

    for _ in 0..3 {
      state = apply_outcome(&state, Outcome::Correct, &policy, now);
    }
    assert_eq!(state.level, MasteryLevel::Review);
  }

  #[test]
  fn test_successful_never_exceeds_total() {
    let now = Utc::now();
    let policy = reset_policy();
    let mut state = fresh(now);

    let outcomes = [
      Outcome::Correct,
      Outcome::Incorrect,
      Outcome::Correct,
      Outcome::Correct,
      Outcome::Incorrect,
    ];
    for outcome in outcomes {
      state = apply_outcome(&state, outcome, &policy, now);
      assert!(state.successful_attempts <= state.total_attempts);
    }
    assert_eq!(state.total_attempts, 5);
    assert_eq!(state.successful_attempts, 3);
  }

  #[test]
  fn test_apply_is_deterministic() {
    let now = Utc::now();
    let policy = DeckLearningPolicy::default();
    let mut state = fresh(now);
    state.streak = 2;
    state.interval_days = 3;
    state.confidence_score = 40;

    let a = apply_outcome(&state, Outcome::Correct, &policy, now);
    let b = apply_outcome(&state, Outcome::Correct, &policy, now);
    assert_eq!(a, b);
  }

  #[test]
  fn test_confidence_moves_and_clamps() {
    let now = Utc::now();
    let policy = DeckLearningPolicy::default();

    let mut state = fresh(now);
    state.confidence_score = 98;
    let up = apply_outcome(&state, Outcome::Correct, &policy, now);
    assert_eq!(up.confidence_score, 100);

    state.confidence_score = 5;
    let down = apply_outcome(&state, Outcome::Incorrect, &policy, now);
    assert_eq!(down.confidence_score, 0);
  }

  #[test]
  fn test_next_due_never_before_last_reviewed() {
    let now = Utc::now();
    let policy = reset_policy();
    let mut state = fresh(now);

    for outcome in [Outcome::Correct, Outcome::Incorrect, Outcome::Correct] {
      state = apply_outcome(&state, outcome, &policy, now);
      assert!(state.next_due_at >= state.last_reviewed_at);
    }
  }
}
