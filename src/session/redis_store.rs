use super::{SessionData, SessionStore};
use crate::error::{session_error, AppResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use tracing::{debug, info};

/// Redis key prefix for session entries
const SESSION_PREFIX: &str = "graph_tutorial:session:";

/// Redis-backed session store, entries expire with the session TTL
pub struct RedisSessionStore {
    client: RedisClient,
    ttl_seconds: u64,
}

impl RedisSessionStore {
    /// Create a client for the given Redis URL
    pub fn new(redis_url: &str, ttl_seconds: u64) -> AppResult<Self> {
        info!("Using Redis session store at {}", redis_url);

        let client = RedisClient::open(redis_url)
            .map_err(|e| session_error(&format!("Failed to create Redis client: {}", e)))?;

        Ok(Self {
            client,
            ttl_seconds,
        })
    }

    /// Check that the server answers before we rely on it
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.get_connection().await?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| session_error(&format!("Redis PING error: {}", e)))?;
        Ok(())
    }

    /// Get a Redis connection from the client
    async fn get_connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| session_error(&format!("Failed to connect to Redis: {}", e)))
    }

    fn key(id: &str) -> String {
        format!("{}{}", SESSION_PREFIX, id)
    }
}

/// Sessions are stored as JSON strings
fn encode(data: &SessionData) -> AppResult<String> {
    Ok(serde_json::to_string(data)?)
}

fn decode(json: &str) -> AppResult<SessionData> {
    Ok(serde_json::from_str(json)?)
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn load(&self, id: &str) -> AppResult<Option<SessionData>> {
        let mut conn = self.get_connection().await?;

        let data: Option<String> = conn
            .get(Self::key(id))
            .await
            .map_err(|e| session_error(&format!("Redis GET error: {}", e)))?;

        match data {
            Some(json) => Ok(Some(decode(&json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, id: &str, data: &SessionData) -> AppResult<()> {
        let json = encode(data)?;
        let mut conn = self.get_connection().await?;

        let _: () = conn
            .set_ex(Self::key(id), json, self.ttl_seconds)
            .await
            .map_err(|e| session_error(&format!("Redis SET error: {}", e)))?;

        debug!("Saved session {}", id);
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut conn = self.get_connection().await?;

        let _: () = conn
            .del(Self::key(id))
            .await
            .map_err(|e| session_error(&format!("Redis DEL error: {}", e)))?;

        Ok(())
    }
}
