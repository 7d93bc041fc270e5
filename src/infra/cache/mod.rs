pub mod memory_cache;
pub mod redis_cache;

pub use memory_cache::MemoryCache;
pub use redis_cache::RedisCache;

pub fn availability_cache_key(resource_id: &str, date_str: &str) -> String {
    format!("availability:resource:{}:{}", resource_id, date_str)
}

/// Glob matching every cached projection of one resource, any date.
pub fn availability_cache_pattern(resource_id: &str) -> String {
    format!("availability:resource:{}:*", resource_id)
}
