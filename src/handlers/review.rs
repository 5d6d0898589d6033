//! Review submission and due-queue handlers.

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::PoisonError;

use crate::config::DEFAULT_DUE_LIMIT;
use crate::db::{self, CardRow};
use crate::domain::{MasteryLevel, Outcome};
use crate::engine::{self, ReviewRequest, ReviewSummary};
use crate::srs;
use crate::state::AppState;

use super::ApiError;

pub async fn submit_review(
    State(state): State<AppState>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<ReviewSummary>, ApiError> {
    let summary = {
        let mut conn = db::try_lock(&state.pool)?;
        engine::record_review(&mut conn, &state.policy_cache, &req, Utc::now())?
    };

    // Keep the learner's session reinforcement queue in step
    let mut sessions = state.sessions.lock().unwrap_or_else(PoisonError::into_inner);
    let session = sessions.entry(req.learner_id).or_default();
    match req.outcome {
        Outcome::Incorrect => session.add_missed_card(req.card_id),
        Outcome::Correct => session.clear_missed_card(req.card_id),
    }

    Ok(Json(summary))
}

#[derive(Debug, Deserialize)]
pub struct DueQuery {
    pub learner_id: i64,
    pub deck_id: Option<i64>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DueCardEntry {
    pub card_id: i64,
    pub next_due_at: DateTime<Utc>,
    pub confidence_score: u8,
    pub mastery_level: MasteryLevel,
}

pub async fn due_cards(
    State(state): State<AppState>,
    Query(query): Query<DueQuery>,
) -> Result<Json<Vec<DueCardEntry>>, ApiError> {
    let now = Utc::now();
    let limit = query.limit.unwrap_or(DEFAULT_DUE_LIMIT);

    let conn = db::try_lock(&state.pool)?;
    let states = engine::get_due_states(&conn, query.learner_id, query.deck_id, Some(limit), now)?;

    let entries = states
        .into_iter()
        .map(|s| DueCardEntry {
            card_id: s.card_id,
            next_due_at: s.next_due_at,
            confidence_score: s.confidence_score,
            // Overdue mastered cards read as review
            mastery_level: s.effective_level(now),
        })
        .collect();

    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct NextCardQuery {
    pub learner_id: i64,
    pub deck_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NextCardResponse {
    pub card: Option<CardRow>,
}

/// Session-driven card pick: reinforcement queue first, then weighted
/// random over the due set.
pub async fn next_card(
    State(state): State<AppState>,
    Query(query): Query<NextCardQuery>,
) -> Result<Json<NextCardResponse>, ApiError> {
    let now = Utc::now();
    let conn = db::try_lock(&state.pool)?;
    let due = engine::get_due_states(&conn, query.learner_id, query.deck_id, None, now)?;

    let picked = {
        let mut sessions = state.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let session = sessions.entry(query.learner_id).or_default();
        srs::select_next_card(session, &due, now)
    };

    let card = match picked {
        Some(card_id) => db::get_card(&conn, card_id)?,
        None => None,
    };

    Ok(Json(NextCardResponse { card }))
}
