//! Chat session inspection and reset

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{ChatMessage, ConversationTurn};

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    pub messages: Vec<ChatMessage>,
    pub history: Vec<ConversationTurn>,
}

/// GET /api/sessions/:id - chat messages and answered history
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let session = state.session(&id)?;
    let session = session.lock().await;

    Ok(Json(SessionResponse {
        session_id: id,
        messages: session.messages().to_vec(),
        history: session.conversation().history().to_vec(),
    }))
}

/// POST /api/sessions/:id/clear - drop chat messages, keep the greeting
pub async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let session = state.session(&id)?;
    let mut session = session.lock().await;
    session.clear();
    tracing::info!(session = %id, "Chat cleared");

    Ok(Json(SessionResponse {
        session_id: id,
        messages: session.messages().to_vec(),
        history: session.conversation().history().to_vec(),
    }))
}

/// DELETE /api/sessions/:id - end the session
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    state.remove_session(&id)?;
    tracing::info!(session = %id, "Chat session deleted");
    Ok(StatusCode::NO_CONTENT)
}
