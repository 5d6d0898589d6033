//! Weighted card selection with a reinforcement queue for missed cards.
//!
//! Session-scoped and in-memory only: nothing here touches persisted
//! mastery state. Cards answered wrong are queued and resurface after a
//! few intervening cards; otherwise selection is weighted random over
//! the due set, favoring low-confidence and struggling cards.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::VecDeque;

use crate::domain::MasteryState;

/// A due card with its calculated selection weight
#[derive(Debug, Clone)]
pub struct CardWeight {
  pub card_id: i64,
  pub weight: f64,
}

/// Per-learner session state tracking the reinforcement queue.
/// Missed cards are shown again within a few cards.
#[derive(Debug, Clone, Default)]
pub struct StudySession {
  /// Queue of card IDs that need reinforcement (recently missed)
  pub reinforcement_queue: VecDeque<i64>,
  /// Counter since the last reinforcement card was shown
  pub cards_since_reinforce: u32,
  /// Last card ID shown (to avoid immediate repeats)
  pub last_card_id: Option<i64>,
}

impl StudySession {
  pub fn new() -> Self {
    Self::default()
  }

  /// Add a missed card to the reinforcement queue
  pub fn add_missed_card(&mut self, card_id: i64) {
    // Avoid duplicates in queue
    if !self.reinforcement_queue.contains(&card_id) {
      self.reinforcement_queue.push_back(card_id);
    }
  }

  /// Remove a card from the reinforcement queue (answered correctly)
  pub fn clear_missed_card(&mut self, card_id: i64) {
    self.reinforcement_queue.retain(|&id| id != card_id);
  }

  /// Check if it's time to show a reinforcement card
  pub fn should_show_reinforcement(&self) -> bool {
    !self.reinforcement_queue.is_empty() && self.cards_since_reinforce >= 3
  }

  /// Get the next reinforcement card if one is due
  pub fn pop_reinforcement(&mut self) -> Option<i64> {
    if self.should_show_reinforcement() {
      self.cards_since_reinforce = 0;
      self.reinforcement_queue.pop_front()
    } else {
      None
    }
  }

  /// Increment the counter after showing a regular card
  pub fn increment_counter(&mut self) {
    self.cards_since_reinforce += 1;
  }
}

/// Calculate the selection weight for a due card from its mastery state
pub fn calculate_card_weight(state: &MasteryState, now: DateTime<Utc>) -> f64 {
  let mut weight = 1.0;

  // Factor 1: Success rate (lower success = higher weight)
  // Range: 1.0 (100% success) to 2.0 (0% success)
  let success_rate = if state.total_attempts > 0 {
    state.success_rate()
  } else {
    0.5 // New cards get neutral weight
  };
  weight *= 2.0 - success_rate;

  // Factor 2: Confidence (shaky cards up to 2x)
  weight *= 1.0 + (100 - state.confidence_score as i64) as f64 / 100.0;

  // Factor 3: Attempt count (barely reviewed cards get priority)
  if state.total_attempts == 0 {
    weight *= 2.0;
  } else if state.total_attempts < 3 {
    weight *= 1.5;
  } else if state.total_attempts < 5 {
    weight *= 1.2;
  }

  // Factor 4: Overdue-ness, up to 2x for cards 10+ hours past due
  let hours_overdue = (now - state.next_due_at).num_hours();
  if hours_overdue > 0 {
    weight *= 1.0 + (hours_overdue as f64 * 0.1).min(1.0);
  }

  weight
}

/// Calculate weights for all due cards
pub fn calculate_all_weights(due: &[MasteryState], now: DateTime<Utc>) -> Vec<CardWeight> {
  due
    .iter()
    .map(|state| CardWeight {
      card_id: state.card_id,
      weight: calculate_card_weight(state, now),
    })
    .collect()
}

/// Select a card using weighted random selection.
/// Higher weight = more likely to be selected.
pub fn weighted_random_select(weights: &[CardWeight], exclude_id: Option<i64>) -> Option<i64> {
  let available: Vec<_> = weights
    .iter()
    .filter(|w| exclude_id.is_none_or(|id| w.card_id != id))
    .collect();

  if available.is_empty() {
    return None;
  }

  if available.len() == 1 {
    return Some(available[0].card_id);
  }

  let total_weight: f64 = available.iter().map(|w| w.weight).sum();

  if total_weight <= 0.0 {
    // Fallback to uniform random if weights are invalid
    let idx = rand::rng().random_range(0..available.len());
    return Some(available[idx].card_id);
  }

  let mut rng = rand::rng();
  let mut target = rng.random_range(0.0..total_weight);

  for w in &available {
    target -= w.weight;
    if target <= 0.0 {
      return Some(w.card_id);
    }
  }

  // Rounding slipped past the last bucket
  Some(available.last().unwrap().card_id)
}

/// Main entry point: pick the next card for a session, honoring the
/// reinforcement queue first
pub fn select_next_card(
  session: &mut StudySession,
  due: &[MasteryState],
  now: DateTime<Utc>,
) -> Option<i64> {
  if let Some(reinforce_id) = session.pop_reinforcement() {
    // The card may have been scheduled out of the due set meanwhile
    if due.iter().any(|s| s.card_id == reinforce_id) {
      session.last_card_id = Some(reinforce_id);
      return Some(reinforce_id);
    }
  }

  let weights = calculate_all_weights(due, now);

  if let Some(card_id) = weighted_random_select(&weights, session.last_card_id) {
    session.increment_counter();
    session.last_card_id = Some(card_id);
    Some(card_id)
  } else {
    None
  }
}
