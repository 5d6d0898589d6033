//! Review event persistence. Append-only; rows are never updated.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result};

use crate::db::LogOnError;
use crate::domain::{Outcome, ReviewEvent, StudyMode};

pub fn insert_review_event(conn: &Connection, event: &ReviewEvent) -> Result<i64> {
    conn.execute(
        r#"
    INSERT INTO review_events (learner_id, card_id, reviewed_at, outcome, study_mode,
                               confidence_before, confidence_after, response_time_ms)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    "#,
        params![
            event.learner_id,
            event.card_id,
            event.reviewed_at.to_rfc3339(),
            event.outcome.as_str(),
            event.study_mode.as_str(),
            event.confidence_before,
            event.confidence_after,
            event.response_time_ms,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Events for one (learner, card) pair, newest first
pub fn get_card_events(
    conn: &Connection,
    learner_id: i64,
    card_id: i64,
    limit: usize,
) -> Result<Vec<ReviewEvent>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, learner_id, card_id, reviewed_at, outcome, study_mode,
           confidence_before, confidence_after, response_time_ms
    FROM review_events
    WHERE learner_id = ?1 AND card_id = ?2
    ORDER BY reviewed_at DESC, id DESC
    LIMIT ?3
    "#,
    )?;

    let events = stmt
        .query_map(params![learner_id, card_id, limit as i64], row_to_event)?
        .collect::<Result<Vec<_>>>()?;
    Ok(events)
}

pub fn count_learner_events(conn: &Connection, learner_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM review_events WHERE learner_id = ?1",
        params![learner_id],
        |row| row.get(0),
    )
}

fn row_to_event(row: &rusqlite::Row) -> Result<ReviewEvent> {
    let reviewed_at_str: String = row.get(3)?;
    let outcome_str: String = row.get(4)?;
    let study_mode_str: String = row.get(5)?;

    Ok(ReviewEvent {
        id: row.get(0)?,
        learner_id: row.get(1)?,
        card_id: row.get(2)?,
        reviewed_at: DateTime::parse_from_rfc3339(&reviewed_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .log_warn("invalid reviewed_at in review event")
            .unwrap_or_else(Utc::now),
        outcome: Outcome::from_str(&outcome_str).unwrap_or(Outcome::Incorrect),
        study_mode: StudyMode::from_str(&study_mode_str).unwrap_or(StudyMode::Flashcard),
        confidence_before: row.get(6)?,
        confidence_after: row.get(7)?,
        response_time_ms: row.get(8)?,
    })
}
