//! Catalog and deck-policy handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::db::{self, CardRow};
use crate::domain::{DeckLearningPolicy, PolicyUpdate};
use crate::engine;
use crate::error::EngineError;
use crate::state::AppState;

use super::ApiError;

#[derive(Debug, Deserialize)]
pub struct CreateNamed {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Created {
    pub id: i64,
}

pub async fn create_learner(
    State(state): State<AppState>,
    Json(req): Json<CreateNamed>,
) -> Result<Json<Created>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(EngineError::validation("learner name must not be empty").into());
    }
    let conn = db::try_lock(&state.pool)?;
    let id = db::insert_learner(&conn, req.name.trim())?;
    Ok(Json(Created { id }))
}

pub async fn create_deck(
    State(state): State<AppState>,
    Json(req): Json<CreateNamed>,
) -> Result<Json<Created>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(EngineError::validation("deck name must not be empty").into());
    }
    let conn = db::try_lock(&state.pool)?;
    let id = db::insert_deck(&conn, req.name.trim())?;
    Ok(Json(Created { id }))
}

#[derive(Debug, Deserialize)]
pub struct CreateCard {
    pub front: String,
    pub back: String,
}

pub async fn create_card(
    State(state): State<AppState>,
    Path(deck_id): Path<i64>,
    Json(req): Json<CreateCard>,
) -> Result<Json<Created>, ApiError> {
    let conn = db::try_lock(&state.pool)?;
    if !db::deck_exists(&conn, deck_id)? {
        return Err(EngineError::not_found(format!("deck {}", deck_id)).into());
    }
    let id = db::insert_card(&conn, deck_id, &req.front, &req.back)?;
    Ok(Json(Created { id }))
}

pub async fn list_deck_cards(
    State(state): State<AppState>,
    Path(deck_id): Path<i64>,
) -> Result<Json<Vec<CardRow>>, ApiError> {
    let conn = db::try_lock(&state.pool)?;
    if !db::deck_exists(&conn, deck_id)? {
        return Err(EngineError::not_found(format!("deck {}", deck_id)).into());
    }
    Ok(Json(db::get_deck_cards(&conn, deck_id)?))
}

pub async fn get_deck_policy(
    State(state): State<AppState>,
    Path(deck_id): Path<i64>,
) -> Result<Json<DeckLearningPolicy>, ApiError> {
    let conn = db::try_lock(&state.pool)?;
    let policy = engine::get_policy(&conn, deck_id)?;
    Ok(Json(policy))
}

pub async fn put_deck_policy(
    State(state): State<AppState>,
    Path(deck_id): Path<i64>,
    Json(update): Json<PolicyUpdate>,
) -> Result<Json<DeckLearningPolicy>, ApiError> {
    let conn = db::try_lock(&state.pool)?;
    let policy = engine::update_policy(&conn, &state.policy_cache, deck_id, &update)?;
    Ok(Json(policy))
}
