//! Learner progress statistics.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};

use crate::domain::MasteryLevel;

#[derive(Debug, Clone, serde::Serialize)]
pub struct LearnerStats {
  pub cards_seen: i64,
  pub due_count: i64,
  pub mastered_count: i64,
  pub total_reviews: i64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DeckProgress {
  pub deck_id: i64,
  pub deck_name: String,
  pub total_cards: i64,
  pub mastered: i64,
}

impl DeckProgress {
  pub fn percentage(&self) -> i64 {
    if self.total_cards > 0 {
      (self.mastered * 100) / self.total_cards
    } else {
      0
    }
  }
}

pub fn get_learner_stats(
  conn: &Connection,
  learner_id: i64,
  now: DateTime<Utc>,
) -> Result<LearnerStats> {
  let cards_seen: i64 = conn.query_row(
    "SELECT COUNT(*) FROM mastery_states WHERE learner_id = ?1",
    params![learner_id],
    |row| row.get(0),
  )?;
  let due_count: i64 = conn.query_row(
    "SELECT COUNT(*) FROM mastery_states WHERE learner_id = ?1 AND next_due_at <= ?2",
    params![learner_id, now.to_rfc3339()],
    |row| row.get(0),
  )?;
  // An overdue mastered card reads as review, so it is not counted here;
  // this matches what the due queue reports for the same row
  let mastered_count: i64 = conn.query_row(
    "SELECT COUNT(*) FROM mastery_states WHERE learner_id = ?1 AND mastery_level = ?2 AND next_due_at > ?3",
    params![learner_id, MasteryLevel::Mastered.as_str(), now.to_rfc3339()],
    |row| row.get(0),
  )?;
  let total_reviews: i64 = conn.query_row(
    "SELECT COALESCE(SUM(total_attempts), 0) FROM mastery_states WHERE learner_id = ?1",
    params![learner_id],
    |row| row.get(0),
  )?;

  Ok(LearnerStats {
    cards_seen,
    due_count,
    mastered_count,
    total_reviews,
  })
}

/// Per-deck mastery progress for one learner. Decks the learner has not
/// touched still appear, with zero mastered. Overdue mastered cards are
/// excluded, same as `get_learner_stats`.
pub fn get_deck_progress(
  conn: &Connection,
  learner_id: i64,
  now: DateTime<Utc>,
) -> Result<Vec<DeckProgress>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT d.id, d.name,
           COUNT(c.id) as total,
           COALESCE(SUM(CASE WHEN m.mastery_level = 'mastered' AND m.next_due_at > ?2
                            THEN 1 ELSE 0 END), 0) as mastered
    FROM decks d
    LEFT JOIN cards c ON c.deck_id = d.id
    LEFT JOIN mastery_states m ON m.card_id = c.id AND m.learner_id = ?1
    GROUP BY d.id
    ORDER BY d.id
    "#,
  )?;

  let progress = stmt
    .query_map(params![learner_id, now.to_rfc3339()], |row| {
      Ok(DeckProgress {
        deck_id: row.get(0)?,
        deck_name: row.get(1)?,
        total_cards: row.get(2)?,
        mastered: row.get(3)?,
      })
    })?
    .collect::<Result<Vec<_>>>()?;
  Ok(progress)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::db::{
    insert_card, insert_deck, insert_learner, run_migrations, upsert_mastery_state,
  };
  use crate::domain::MasteryState;
  use chrono::Duration;

  #[test]
  fn test_stats_counts() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    let learner = insert_learner(&conn, "mika").unwrap();
    let deck = insert_deck(&conn, "French A1").unwrap();
    let now = Utc::now();

    // One due card, one mastered card scheduled into the future
    let due_card = insert_card(&conn, deck, "chien", "dog").unwrap();
    let mut due = MasteryState::new(learner, due_card, now);
    due.total_attempts = 2;
    due.next_due_at = now - Duration::hours(1);
    upsert_mastery_state(&conn, &due).unwrap();

    let mastered_card = insert_card(&conn, deck, "chat", "cat").unwrap();
    let mut mastered = MasteryState::new(learner, mastered_card, now);
    mastered.level = MasteryLevel::Mastered;
    mastered.total_attempts = 5;
    mastered.next_due_at = now + Duration::days(10);
    upsert_mastery_state(&conn, &mastered).unwrap();

    let stats = get_learner_stats(&conn, learner, now).unwrap();
    assert_eq!(stats.cards_seen, 2);
    assert_eq!(stats.due_count, 1);
    assert_eq!(stats.mastered_count, 1);
    assert_eq!(stats.total_reviews, 7);
  }

  #[test]
  fn test_stats_empty_learner() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    let learner = insert_learner(&conn, "mika").unwrap();

    let stats = get_learner_stats(&conn, learner, Utc::now()).unwrap();
    assert_eq!(stats.cards_seen, 0);
    assert_eq!(stats.due_count, 0);
    assert_eq!(stats.mastered_count, 0);
    assert_eq!(stats.total_reviews, 0);
  }

  #[test]
  fn test_deck_progress() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    let learner = insert_learner(&conn, "mika").unwrap();
    let deck = insert_deck(&conn, "French A1").unwrap();
    let now = Utc::now();

    let card_a = insert_card(&conn, deck, "chien", "dog").unwrap();
    let _card_b = insert_card(&conn, deck, "chat", "cat").unwrap();

    let mut state = MasteryState::new(learner, card_a, now);
    state.level = MasteryLevel::Mastered;
    state.next_due_at = now + Duration::days(5);
    upsert_mastery_state(&conn, &state).unwrap();

    let progress = get_deck_progress(&conn, learner, now).unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].total_cards, 2);
    assert_eq!(progress[0].mastered, 1);
    assert_eq!(progress[0].percentage(), 50);
  }

  #[test]
  fn test_overdue_mastered_not_counted_as_mastered() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    let learner = insert_learner(&conn, "mika").unwrap();
    let deck = insert_deck(&conn, "French A1").unwrap();
    let now = Utc::now();

    // Stored level is mastered but the due date has passed, so every
    // read path reports it as back in review
    let card = insert_card(&conn, deck, "chien", "dog").unwrap();
    let mut state = MasteryState::new(learner, card, now);
    state.level = MasteryLevel::Mastered;
    state.next_due_at = now - Duration::hours(3);
    upsert_mastery_state(&conn, &state).unwrap();

    let stats = get_learner_stats(&conn, learner, now).unwrap();
    assert_eq!(stats.mastered_count, 0);
    assert_eq!(stats.due_count, 1);

    let progress = get_deck_progress(&conn, learner, now).unwrap();
    assert_eq!(progress[0].mastered, 0);
  }

  #[test]
  fn test_deck_progress_untouched_deck() {
    let conn = Connection::open_in_memory().unwrap();
    run_migrations(&conn).unwrap();
    let learner = insert_learner(&conn, "mika").unwrap();
    let deck = insert_deck(&conn, "French A1").unwrap();
    insert_card(&conn, deck, "chien", "dog").unwrap();

    let progress = get_deck_progress(&conn, learner, Utc::now()).unwrap();
    assert_eq!(progress.len(), 1);
    assert_eq!(progress[0].mastered, 0);
    assert_eq!(progress[0].percentage(), 0);
  }
}
