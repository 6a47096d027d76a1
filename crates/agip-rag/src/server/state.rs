//! Shared state of the HTTP server

use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::assistant::Assistant;
use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::types::ChatSession;

/// Chat session guarded for one request at a time
pub type SharedSession = Arc<Mutex<ChatSession>>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Answering engine, read-only for the process lifetime
    assistant: Arc<Assistant>,
    /// Live chat sessions, dropped on restart
    sessions: DashMap<Uuid, SessionEntry>,
    /// Idle time after which a session is pruned
    session_ttl: Duration,
}

struct SessionEntry {
    session: SharedSession,
    last_seen: Instant,
}

impl SessionEntry {
    fn new(session: SharedSession) -> Self {
        Self {
            session,
            last_seen: Instant::now(),
        }
    }
}

impl AppState {
    pub fn new(config: RagConfig, assistant: Arc<Assistant>) -> Self {
        let session_ttl = Duration::from_secs(config.server.session_ttl_secs);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                assistant,
                sessions: DashMap::new(),
                session_ttl,
            }),
        }
    }

    /// Load the knowledge index and build the production assistant
    pub fn from_config(config: RagConfig, api_key: Option<String>) -> Result<Self> {
        let assistant = Assistant::from_config(&config, api_key)?;
        Ok(Self::new(config, Arc::new(assistant)))
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn assistant(&self) -> &Arc<Assistant> {
        &self.inner.assistant
    }

    /// Open a new session starting with the greeting.
    ///
    /// Sessions idle for at least `server.session_ttl_secs` are pruned first.
    pub fn create_session(&self) -> (Uuid, SharedSession) {
        self.prune_idle_sessions();

        let session = ChatSession::new();
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));
        self.inner
            .sessions
            .insert(id, SessionEntry::new(Arc::clone(&shared)));
        tracing::debug!(session = %id, "Chat session created");
        (id, shared)
    }

    /// Look up a session and mark it as used
    pub fn session(&self, id: &Uuid) -> Result<SharedSession> {
        let mut entry = self
            .inner
            .sessions
            .get_mut(id)
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;
        entry.last_seen = Instant::now();
        Ok(Arc::clone(&entry.session))
    }

    /// End a session, discarding its messages and history
    pub fn remove_session(&self, id: &Uuid) -> Result<()> {
        match self.inner.sessions.remove(id) {
            Some(_) => Ok(()),
            None => Err(Error::SessionNotFound(id.to_string())),
        }
    }

    /// Drop sessions idle for at least the configured TTL; returns how many went
    pub fn prune_idle_sessions(&self) -> usize {
        let ttl = self.inner.session_ttl;
        let before = self.inner.sessions.len();
        self.inner
            .sessions
            .retain(|_, entry| entry.last_seen.elapsed() < ttl);

        let pruned = before.saturating_sub(self.inner.sessions.len());
        if pruned > 0 {
            tracing::info!(pruned, "Idle chat sessions discarded");
        }
        pruned
    }

    pub fn session_count(&self) -> usize {
        self.inner.sessions.len()
    }
}
