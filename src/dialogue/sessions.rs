//! Chat sessions — one dialogue engine per visitor, pruned when idle.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use super::engine::DialogueEngine;
use crate::config::TypingTiming;

struct SessionEntry {
    engine: Arc<DialogueEngine>,
    last_active: Instant,
}

/// In-memory registry of live conversations.
pub struct ChatSessions {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    timing: TypingTiming,
    external_url: String,
}

impl ChatSessions {
    pub fn new(timing: TypingTiming, external_url: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            timing,
            external_url: external_url.into(),
        })
    }

    /// Start a new conversation.
    pub async fn create(&self) -> (Uuid, Arc<DialogueEngine>) {
        let id = Uuid::new_v4();
        let engine = DialogueEngine::new(self.timing, self.external_url.clone());
        self.sessions.write().await.insert(
            id,
            SessionEntry {
                engine: Arc::clone(&engine),
                last_active: Instant::now(),
            },
        );
        info!(session_id = %id, "Chat session created");
        (id, engine)
    }

    /// Look up a conversation and mark it active.
    pub async fn get(&self, id: Uuid) -> Option<Arc<DialogueEngine>> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_active = Instant::now();
        Some(Arc::clone(&entry.engine))
    }

    /// Mark a conversation active without handing out its engine.
    ///
    /// Returns false once the session has been pruned.
    pub async fn touch(&self, id: Uuid) -> bool {
        match self.sessions.write().await.get_mut(&id) {
            Some(entry) => {
                entry.last_active = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Number of live conversations.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop conversations idle for at least `idle`. Returns how many went.
    pub async fn prune_idle(&self, idle: Duration) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_active.elapsed() < idle);
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!(count = pruned, "Pruned idle chat sessions");
        }
        pruned
    }
}

/// Spawn a background task that periodically prunes idle sessions.
pub fn spawn_prune_task(
    sessions: Arc<ChatSessions>,
    idle: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            sessions.prune_idle(idle).await;
        }
    })
}
