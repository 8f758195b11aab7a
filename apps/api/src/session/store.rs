use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info};
use uuid::Uuid;

use super::{Conversation, SessionError, SessionState};
use crate::tabs::{PhaseTrigger, TabBoard, TabId};

/// One browser session's chat context.
#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub state: SessionState,
    pub conversation: Conversation,
    pub tabs: TabBoard,
    active_turn: Option<TabId>,
}

pub type SharedSession = Arc<Mutex<Session>>;

/// Serializable view of a session returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub state: SessionState,
    pub active_system_prompt: String,
    pub conversation: Conversation,
    pub tabs: TabBoard,
    pub streaming_tab: Option<TabId>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            state: SessionState::default(),
            conversation: Conversation::new(),
            tabs: TabBoard::default(),
            active_turn: None,
        }
    }

    pub fn active_turn(&self) -> Option<TabId> {
        self.active_turn
    }

    /// Fails when a response is still streaming for this session.
    pub fn ensure_idle(&self) -> Result<(), SessionError> {
        match self.active_turn {
            Some(_) => Err(SessionError::TurnInFlight),
            None => Ok(()),
        }
    }

    /// Marks `tab` as owning the single outstanding turn.
    pub fn begin_turn(&mut self, tab: TabId) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.active_turn = Some(tab);
        Ok(())
    }

    /// Stores the history a finished turn produced and releases the turn.
    pub fn finish_turn(&mut self, conversation: Conversation) {
        self.conversation = conversation;
        if let Some(tab) = self.active_turn.take() {
            // A reset while streaming already moved the tab back to input.
            let _ = self.tabs.transition(tab, PhaseTrigger::Completed);
        }
    }

    /// Empties the conversation. The next send re-seeds the system prompt.
    pub fn clear_history(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.conversation.clear();
        self.state.invalidate_context();
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            created_at: self.created_at,
            state: self.state.clone(),
            active_system_prompt: self.state.active_system_prompt().to_string(),
            conversation: self.conversation.clone(),
            tabs: self.tabs.clone(),
            streaming_tab: self.active_turn,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

struct StoreEntry {
    session: SharedSession,
    last_active: Instant,
}

/// In-memory session registry. Nothing is persisted; sessions idle for
/// longer than the configured TTL are dropped by `prune_idle`.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, StoreEntry>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> SharedSession {
        let session = Session::new();
        let id = session.id;
        let shared = Arc::new(Mutex::new(session));
        self.inner.write().await.insert(
            id,
            StoreEntry {
                session: Arc::clone(&shared),
                last_active: Instant::now(),
            },
        );
        info!("Session {id} created");
        shared
    }

    /// Looks up a session and marks it as active.
    pub async fn get(&self, id: Uuid) -> Result<SharedSession, SessionError> {
        let mut sessions = self.inner.write().await;
        let entry = sessions.get_mut(&id).ok_or(SessionError::NotFound(id))?;
        entry.last_active = Instant::now();
        Ok(Arc::clone(&entry.session))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), SessionError> {
        self.inner
            .write()
            .await
            .remove(&id)
            .map(|_| info!("Session {id} removed"))
            .ok_or(SessionError::NotFound(id))
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Drops sessions not used for `ttl`. A session that is streaming a turn
    /// or locked by a handler is kept until a later sweep.
    pub async fn prune_idle(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            if now.duration_since(entry.last_active) < ttl {
                return true;
            }
            let busy = match entry.session.try_lock() {
                Ok(session) => session.active_turn().is_some(),
                Err(_) => true,
            };
            if !busy {
                debug!("Session {id} expired");
            }
            busy
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!("Pruned {pruned} idle sessions, {} remaining", sessions.len());
        }
        pruned
    }
}

/// Sweeps idle sessions every `every` until the runtime shuts down.
pub fn spawn_idle_sweeper(store: SessionStore, ttl: Duration, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            store.prune_idle(ttl).await;
        }
    })
}
