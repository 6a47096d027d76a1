//! API routes for the assistant server

pub mod chat;
pub mod sessions;

use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::generation::messages::SUGGESTED_QUESTIONS;
use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::chat))
        .route(
            "/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/sessions/:id/clear", post(sessions::clear_session))
        .route("/suggestions", get(suggestions))
}

/// GET /api/suggestions - starter questions for an empty chat
async fn suggestions() -> Json<Vec<&'static str>> {
    Json(SUGGESTED_QUESTIONS.to_vec())
}
