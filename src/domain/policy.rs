use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Per-deck knobs that parameterize the scheduler.
///
/// Read-only to the scheduler; writes go through a validated update path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckLearningPolicy {
  /// Consecutive correct reviews required before a card counts as learned
  pub required_correct_to_learn: i64,
  /// Promote to mastered automatically once the streak threshold is met
  pub auto_mark_learned: bool,
  /// A wrong answer resets the streak and the interval to 1 day
  pub reset_on_wrong_answer: bool,
}

impl Default for DeckLearningPolicy {
  fn default() -> Self {
    Self {
      required_correct_to_learn: 3,
      auto_mark_learned: true,
      reset_on_wrong_answer: false,
    }
  }
}

impl DeckLearningPolicy {
  pub fn validate(&self) -> EngineResult<()> {
    if self.required_correct_to_learn < 1 {
      return Err(EngineError::validation(format!(
        "required_correct_to_learn must be >= 1, got {}",
        self.required_correct_to_learn
      )));
    }
    Ok(())
  }
}

/// Partial policy update; absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PolicyUpdate {
  pub required_correct_to_learn: Option<i64>,
  pub auto_mark_learned: Option<bool>,
  pub reset_on_wrong_answer: Option<bool>,
}

impl PolicyUpdate {
  /// Apply this update on top of `current`, validating the result.
  pub fn apply(&self, current: DeckLearningPolicy) -> EngineResult<DeckLearningPolicy> {
    let next = DeckLearningPolicy {
      required_correct_to_learn: self
        .required_correct_to_learn
        .unwrap_or(current.required_correct_to_learn),
      auto_mark_learned: self.auto_mark_learned.unwrap_or(current.auto_mark_learned),
      reset_on_wrong_answer: self
        .reset_on_wrong_answer
        .unwrap_or(current.reset_on_wrong_answer),
    };
    next.validate()?;
    Ok(next)
  }
}
