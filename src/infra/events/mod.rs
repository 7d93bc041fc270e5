pub mod consumer;
pub mod memory_stream;
pub mod redis_stream;

pub use consumer::EventConsumer;
pub use memory_stream::MemoryStreamFabric;
pub use redis_stream::RedisStreamFabric;
