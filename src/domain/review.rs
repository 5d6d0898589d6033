use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a single answer attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
  Correct,
  Incorrect,
}

impl Outcome {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Correct => "correct",
      Self::Incorrect => "incorrect",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "correct" => Some(Self::Correct),
      "incorrect" => Some(Self::Incorrect),
      _ => None,
    }
  }

  pub fn is_correct(&self) -> bool {
    matches!(self, Self::Correct)
  }
}

/// Study mode indicates which UI/interaction mode produced the answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
  Flashcard, // Flip card, self-rate
  Matching,  // Pair fronts with backs
  Spaced,    // Scheduled review session
  Test,      // Graded quiz
}

impl StudyMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Flashcard => "flashcard",
      Self::Matching => "matching",
      Self::Spaced => "spaced",
      Self::Test => "test",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    match s {
      "flashcard" => Some(Self::Flashcard),
      "matching" => Some(Self::Matching),
      "spaced" => Some(Self::Spaced),
      "test" => Some(Self::Test),
      _ => None,
    }
  }
}

/// Immutable record of one answer attempt.
///
/// Append-only: rows are never updated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEvent {
  pub id: i64,
  pub learner_id: i64,
  pub card_id: i64,
  pub reviewed_at: DateTime<Utc>,
  pub outcome: Outcome,
  pub study_mode: StudyMode,
  pub confidence_before: Option<u8>,
  pub confidence_after: Option<u8>,
  pub response_time_ms: Option<i64>,
}

impl ReviewEvent {
  pub fn new(learner_id: i64, card_id: i64, outcome: Outcome, study_mode: StudyMode) -> Self {
    Self {
      id: 0,
      learner_id,
      card_id,
      reviewed_at: Utc::now(),
      outcome,
      study_mode,
      confidence_before: None,
      confidence_after: None,
      response_time_ms: None,
    }
  }
}
