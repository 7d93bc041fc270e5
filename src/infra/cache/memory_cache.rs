use crate::domain::ports::Cache;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Process-local cache with the same TTL semantics as the Redis adapter.
/// Used by the tests and when no REDIS_URL is configured.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) {
        let deadline = Instant::now() + Duration::from_secs(ttl_secs);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_string(), deadline));
    }

    async fn delete(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    async fn delete_matching(&self, pattern: &str) {
        let prefix = pattern.trim_end_matches('*');
        self.entries.lock().unwrap().retain(|key, _| !key.starts_with(prefix));
    }
}
