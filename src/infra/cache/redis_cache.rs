use crate::domain::ports::Cache;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::{debug, warn};

/// Redis-backed cache. Every error degrades: reads become misses, writes and
/// invalidations are logged and dropped, so cache unavailability never fails
/// a request.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut conn = self.manager.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(value) => {
                debug!(key, hit = value.is_some(), "cache get");
                value
            }
            Err(e) => {
                warn!(key, "cache read failed: {}", e);
                None
            }
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        let mut conn = self.manager.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, value, ttl_secs).await {
            warn!(key, "cache write failed: {}", e);
        }
    }

    async fn delete(&self, key: &str) {
        let mut conn = self.manager.clone();
        if let Err(e) = conn.del::<_, i64>(key).await {
            warn!(key, "cache delete failed: {}", e);
        }
    }

    async fn delete_matching(&self, pattern: &str) {
        let mut conn = self.manager.clone();
        let keys: Vec<String> = match conn.keys(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                warn!(pattern, "cache scan failed: {}", e);
                return;
            }
        };
        if keys.is_empty() {
            return;
        }
        if let Err(e) = conn.del::<_, i64>(keys).await {
            warn!(pattern, "cache bulk delete failed: {}", e);
        }
    }
}
