use super::SessionData;
use crate::error::AppResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

/// Storage backend for visitor sessions
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Load the data stored under a session id
    async fn load(&self, id: &str) -> AppResult<Option<SessionData>>;

    /// Store data under a session id, replacing what was there
    async fn save(&self, id: &str, data: &SessionData) -> AppResult<()>;

    /// Remove a session entirely
    async fn delete(&self, id: &str) -> AppResult<()>;
}

/// Upper bound that keeps `Instant` arithmetic from overflowing
const MAX_TTL_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

/// Stored session data with its expiry
#[derive(Debug)]
struct Entry {
    data: SessionData,
    expires_at: Instant,
}

/// In-memory implementation of the session store, entries expire after the TTL
#[derive(Debug)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_seconds.min(MAX_TTL_SECONDS)),
        }
    }

    /// Number of sessions currently held, expired ones included until the next save
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, id: &str) -> AppResult<Option<SessionData>> {
        let sessions = self.sessions.read().await;
        let now = Instant::now();
        Ok(sessions
            .get(id)
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.data.clone()))
    }

    async fn save(&self, id: &str, data: &SessionData) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();

        // Drop expired sessions
        let before = sessions.len();
        sessions.retain(|_, entry| entry.expires_at > now);
        if sessions.len() < before {
            debug!("Purged {} expired sessions", before - sessions.len());
        }

        sessions.insert(
            id.to_string(),
            Entry {
                data: data.clone(),
                expires_at: now + self.ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
        Ok(())
    }
}
