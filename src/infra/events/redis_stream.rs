use crate::domain::models::event::{EventEnvelope, EventMetadata};
use crate::domain::ports::{EventBus, EventStream, StreamMessage};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::streams::{StreamMaxlen, StreamRangeReply, StreamReadOptions, StreamReadReply};
use redis::AsyncCommands;

/// Redis Streams fabric: XADD on the publish side, consumer groups with
/// pending-entry reclaim on the consume side. At-least-once: messages are
/// acked only after the handler succeeds.
#[derive(Clone)]
pub struct RedisStreamFabric {
    manager: ConnectionManager,
}

impl RedisStreamFabric {
    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }

    fn fields(envelope: &EventEnvelope) -> Result<Vec<(String, String)>, AppError> {
        let payload = serde_json::to_string(&envelope.payload)
            .map_err(|e| AppError::InternalWithMsg(format!("payload serialization failed: {}", e)))?;
        let metadata = serde_json::to_string(&envelope.metadata)
            .map_err(|e| AppError::InternalWithMsg(format!("metadata serialization failed: {}", e)))?;
        Ok(vec![
            ("event_type".to_string(), envelope.event_type.clone()),
            ("payload".to_string(), payload),
            ("metadata".to_string(), metadata),
        ])
    }

    fn decode(id: &str, map: &std::collections::HashMap<String, redis::Value>) -> Option<StreamMessage> {
        let get = |key: &str| -> Option<String> {
            map.get(key).and_then(|v| redis::from_redis_value::<String>(v).ok())
        };

        let event_type = get("event_type")?;
        let payload = serde_json::from_str(&get("payload").unwrap_or_else(|| "{}".into())).ok()?;
        let metadata = get("metadata")
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_else(|| EventMetadata {
                tenant_id: String::new(),
                emitted_at: Utc::now(),
                event_version: crate::domain::models::event::EVENT_VERSION.to_string(),
            });

        Some(StreamMessage {
            id: id.to_string(),
            envelope: EventEnvelope {
                event_type,
                payload,
                metadata,
            },
        })
    }
}

fn fabric_err(e: redis::RedisError) -> AppError {
    AppError::DependencyUnavailable(format!("event fabric: {}", e))
}

#[async_trait]
impl EventBus for RedisStreamFabric {
    async fn publish(&self, stream: &str, envelope: &EventEnvelope) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let fields = Self::fields(envelope)?;
        conn.xadd_maxlen::<_, _, _, _, String>(stream, StreamMaxlen::Approx(1000), "*", &fields)
            .await
            .map_err(fabric_err)?;
        Ok(())
    }
}

#[async_trait]
impl EventStream for RedisStreamFabric {
    async fn ensure_group(&self, stream: &str, group: &str) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        match conn.xgroup_create_mkstream::<_, _, _, String>(stream, group, "0").await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("BUSYGROUP") => Ok(()),
            Err(e) => Err(fabric_err(e)),
        }
    }

    async fn read_new(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
        block_ms: u64,
    ) -> Result<Vec<StreamMessage>, AppError> {
        let mut conn = self.manager.clone();
        // BLOCK 0 waits forever; treat zero as a non-blocking read.
        let mut options = StreamReadOptions::default().group(group, consumer).count(count);
        if block_ms > 0 {
            options = options.block(block_ms as usize);
        }
        let reply: StreamReadReply = conn
            .xread_options(&[stream], &[">"], &options)
            .await
            .map_err(fabric_err)?;

        let mut messages = Vec::new();
        for key in reply.keys {
            for entry in key.ids {
                if let Some(message) = Self::decode(&entry.id, &entry.map) {
                    messages.push(message);
                }
            }
        }
        Ok(messages)
    }

    async fn read_pending(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
    ) -> Result<Vec<StreamMessage>, AppError> {
        let mut conn = self.manager.clone();
        let pending: redis::streams::StreamPendingCountReply = conn
            .xpending_consumer_count(stream, group, "-", "+", count, consumer)
            .await
            .map_err(fabric_err)?;

        let mut messages = Vec::new();
        for entry in pending.ids {
            let range: StreamRangeReply = conn
                .xrange(stream, &entry.id, &entry.id)
                .await
                .map_err(fabric_err)?;
            for item in range.ids {
                if let Some(message) = Self::decode(&item.id, &item.map) {
                    messages.push(message);
                }
            }
        }
        Ok(messages)
    }

    async fn ack(&self, stream: &str, group: &str, message_id: &str) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        conn.xack::<_, _, _, i64>(stream, group, &[message_id])
            .await
            .map_err(fabric_err)?;
        Ok(())
    }
}
