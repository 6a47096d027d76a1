//! Chat endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{AnswerOutcome, SourceRef};

/// Body of `POST /api/chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    /// Chunks to retrieve, clamped to the configured range
    #[serde(default)]
    pub k: Option<usize>,
    /// Existing session; a new one is opened when absent
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub answer: String,
    /// `answered`, `no_match`, `transient_failure` or `configuration_error`
    pub outcome: &'static str,
    pub sources: Vec<SourceRef>,
}

impl ChatResponse {
    fn new(session_id: Uuid, outcome: AnswerOutcome) -> Self {
        Self {
            session_id,
            outcome: outcome.kind(),
            sources: outcome.sources().to_vec(),
            answer: outcome.into_text(),
        }
    }
}

/// POST /api/chat - ask a question within a session
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(Error::InvalidRequest("question must not be empty".into()));
    }

    let (session_id, session) = match request.session_id {
        Some(id) => (id, state.session(&id)?),
        None => state.create_session(),
    };

    tracing::info!(session = %session_id, "Question: \"{}\"", question);

    let assistant = state.assistant();
    let k = request
        .k
        .map_or_else(|| assistant.default_k(), |k| assistant.retrieval().clamp_k(k));

    let mut session = session.lock().await;
    session.push_user(question);
    let outcome = assistant
        .answer(session.conversation_mut(), question, k)
        .await;
    session.push_assistant(outcome.text());

    if outcome.is_failure() {
        tracing::warn!(session = %session_id, outcome = outcome.kind(), "Question not answered");
    }

    Ok(Json(ChatResponse::new(session_id, outcome)))
}
