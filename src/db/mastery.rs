//! Mastery state rows: one per (learner, card), rewritten whole on
//! every review transaction.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};

use crate::db::LogOnError;
use crate::domain::{MasteryLevel, MasteryState};

pub fn get_mastery_state(
  conn: &Connection,
  learner_id: i64,
  card_id: i64,
) -> Result<Option<MasteryState>> {
  let mut stmt = conn.prepare(
    r#"
    SELECT learner_id, card_id, confidence_score, mastery_level, streak, total_attempts,
           successful_attempts, interval_days, ease_factor, last_reviewed_at, next_due_at
    FROM mastery_states
    WHERE learner_id = ?1 AND card_id = ?2
    "#,
  )?;

  let mut rows = stmt.query(params![learner_id, card_id])?;
  if let Some(row) = rows.next()? {
    Ok(Some(row_to_state(row)?))
  } else {
    Ok(None)
  }
}

pub fn upsert_mastery_state(conn: &Connection, state: &MasteryState) -> Result<()> {
  conn.execute(
    r#"
    INSERT INTO mastery_states (learner_id, card_id, confidence_score, mastery_level, streak,
                                total_attempts, successful_attempts, interval_days, ease_factor,
                                last_reviewed_at, next_due_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
    ON CONFLICT (learner_id, card_id) DO UPDATE SET
      confidence_score = excluded.confidence_score,
      mastery_level = excluded.mastery_level,
      streak = excluded.streak,
      total_attempts = excluded.total_attempts,
      successful_attempts = excluded.successful_attempts,
      interval_days = excluded.interval_days,
      ease_factor = excluded.ease_factor,
      last_reviewed_at = excluded.last_reviewed_at,
      next_due_at = excluded.next_due_at
    "#,
    params![
      state.learner_id,
      state.card_id,
      state.confidence_score,
      state.level.as_str(),
      state.streak,
      state.total_attempts,
      state.successful_attempts,
      state.interval_days,
      state.ease_factor,
      state.last_reviewed_at.to_rfc3339(),
      state.next_due_at.to_rfc3339(),
    ],
  )?;
  Ok(())
}

/// Cards due at `now` for a learner, most overdue first, ties broken by
/// lowest confidence. The limit truncates after ordering.
pub fn get_due_states(
  conn: &Connection,
  learner_id: i64,
  deck_id: Option<i64>,
  limit: Option<usize>,
  now: DateTime<Utc>,
) -> Result<Vec<MasteryState>> {
  let now_str = now.to_rfc3339();
  // SQLite treats a negative LIMIT as unlimited
  let limit = limit.map(|l| l as i64).unwrap_or(-1);

  let states = if let Some(deck_id) = deck_id {
    let mut stmt = conn.prepare(
      r#"
      SELECT m.learner_id, m.card_id, m.confidence_score, m.mastery_level, m.streak,
             m.total_attempts, m.successful_attempts, m.interval_days, m.ease_factor,
             m.last_reviewed_at, m.next_due_at
      FROM mastery_states m
      JOIN cards c ON c.id = m.card_id
      WHERE m.learner_id = ?1 AND m.next_due_at <= ?2 AND c.deck_id = ?3
      ORDER BY m.next_due_at ASC, m.confidence_score ASC
      LIMIT ?4
      "#,
    )?;
    stmt
      .query_map(params![learner_id, now_str, deck_id, limit], row_to_state)?
      .collect::<Result<Vec<_>>>()?
  } else {
    let mut stmt = conn.prepare(
      r#"
      SELECT learner_id, card_id, confidence_score, mastery_level, streak, total_attempts,
             successful_attempts, interval_days, ease_factor, last_reviewed_at, next_due_at
      FROM mastery_states
      WHERE learner_id = ?1 AND next_due_at <= ?2
      ORDER BY next_due_at ASC, confidence_score ASC
      LIMIT ?3
      "#,
    )?;
    stmt
      .query_map(params![learner_id, now_str, limit], row_to_state)?
      .collect::<Result<Vec<_>>>()?
  };

  Ok(states)
}

fn row_to_state(row: &rusqlite::Row) -> Result<MasteryState> {
  let level_str: String = row.get(3)?;
  let last_reviewed_str: String = row.get(9)?;
  let next_due_str: String = row.get(10)?;

  Ok(MasteryState {
    learner_id: row.get(0)?,
    card_id: row.get(1)?,
    confidence_score: row.get(2)?,
    level: MasteryLevel::from_str(&level_str),
    streak: row.get(4)?,
    total_attempts: row.get(5)?,
    successful_attempts: row.get(6)?,
    interval_days: row.get(7)?,
    ease_factor: row.get(8)?,
    last_reviewed_at: DateTime::parse_from_rfc3339(&last_reviewed_str)
      .map(|dt| dt.with_timezone(&Utc))
      .log_warn("invalid last_reviewed_at in mastery row")
      .unwrap_or_else(Utc::now),
    next_due_at: DateTime::parse_from_rfc3339(&next_due_str)
      .map(|dt| dt.with_timezone(&Utc))
      .log_warn("invalid next_due_at in mastery row")
      .unwrap_or_else(Utc::now),
  })
}
