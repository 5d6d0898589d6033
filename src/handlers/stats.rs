//! Learner progress handlers.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::db::{self, LearnerStats};
use crate::error::EngineError;
use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Serialize)]
pub struct DeckProgressEntry {
    pub deck_id: i64,
    pub deck_name: String,
    pub total_cards: i64,
    pub mastered: i64,
    pub percentage: i64,
}

#[derive(Debug, Serialize)]
pub struct LearnerStatsResponse {
    #[serde(flatten)]
    pub stats: LearnerStats,
    pub decks: Vec<DeckProgressEntry>,
}

pub async fn learner_stats(
    State(state): State<AppState>,
    Path(learner_id): Path<i64>,
) -> Result<Json<LearnerStatsResponse>, ApiError> {
    let conn = db::try_lock(&state.pool)?;
    if !db::learner_exists(&conn, learner_id)? {
        return Err(EngineError::not_found(format!("learner {}", learner_id)).into());
    }

    let now = Utc::now();
    let stats = db::get_learner_stats(&conn, learner_id, now)?;
    let decks = db::get_deck_progress(&conn, learner_id, now)?
        .into_iter()
        .map(|p| DeckProgressEntry {
            percentage: p.percentage(),
            deck_id: p.deck_id,
            deck_name: p.deck_name,
            total_cards: p.total_cards,
            mastered: p.mastered,
        })
        .collect();

    Ok(Json(LearnerStatsResponse { stats, decks }))
}
