//! Conversation history and chat session state
//!
//! Both are owned by the caller: one [`ChatSession`] per user session,
//! dropped when the session ends. Nothing here is persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::generation::messages::GREETING;

/// One answered question
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

/// (question, answer) history of one assistant session
#[derive(Debug, Clone, Default, Serialize)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn
    pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(ConversationTurn {
            question: question.into(),
            answer: answer.into(),
            asked_at: Utc::now(),
        });
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Sentiment placeholder; every message is currently neutral
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    #[default]
    Neutral,
}

/// A message as displayed in the chat
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub text: String,
    pub is_user: bool,
    pub sentiment: Sentiment,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }

    fn new(text: impl Into<String>, is_user: bool) -> Self {
        Self {
            text: text.into(),
            is_user,
            sentiment: Sentiment::Neutral,
            sent_at: Utc::now(),
        }
    }
}

/// Chat state of one user session
#[derive(Debug, Clone, Serialize)]
pub struct ChatSession {
    pub id: Uuid,
    messages: Vec<ChatMessage>,
    conversation: Conversation,
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    /// New session opened with the assistant's greeting
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            messages: vec![ChatMessage::assistant(GREETING)],
            conversation: Conversation::new(),
            created_at: Utc::now(),
        }
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::user(text));
    }

    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(text));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn conversation_mut(&mut self) -> &mut Conversation {
        &mut self.conversation
    }

    /// Whether only the greeting has been shown so far
    pub fn is_fresh(&self) -> bool {
        self.messages.len() <= 1
    }

    /// Drop every message except the greeting.
    ///
    /// The conversation history is kept: it lives as long as the session.
    pub fn clear(&mut self) {
        self.messages.truncate(1);
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
