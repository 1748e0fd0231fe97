//! Session registry: one isolated conversation per browser session.
//!
//! The registry lock only guards the map; each session sits behind its own
//! mutex, so one session's blocking model call never stalls another. Within
//! a session, requests are handled strictly one at a time.

use std::collections::HashMap;
use std::sync::Arc;

use intellichat_core::ChatSession;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub type SharedSession = Arc<Mutex<ChatSession>>;

#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self, session: ChatSession) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Removes the session, dropping its transcript.
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
