pub mod decks;
pub mod review;
pub mod stats;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::db::DbLockError;
use crate::error::EngineError;
use crate::state::AppState;

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/learners", post(decks::create_learner))
        .route("/learners/{learner_id}/stats", get(stats::learner_stats))
        .route("/decks", post(decks::create_deck))
        .route(
            "/decks/{deck_id}/cards",
            post(decks::create_card).get(decks::list_deck_cards),
        )
        .route(
            "/decks/{deck_id}/policy",
            get(decks::get_deck_policy).put(decks::put_deck_policy),
        )
        .route("/reviews", post(review::submit_review))
        .route("/due", get(review::due_cards))
        .route("/study/next", get(review::next_card))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Engine errors rendered as JSON responses
pub struct ApiError(EngineError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Conflict(_) => StatusCode::CONFLICT,
            EngineError::Storage(e) => {
                tracing::error!("storage error: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self(e)
    }
}

impl From<DbLockError> for ApiError {
    fn from(e: DbLockError) -> Self {
        Self(EngineError::Conflict(e.to_string()))
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> Self {
        Self(e.into())
    }
}
