use crate::domain::models::event::EventEnvelope;
use crate::domain::ports::{EventBus, EventStream, StreamMessage};
use crate::error::AppError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct GroupState {
    next_index: usize,
    /// message id -> (claiming consumer, envelope), kept until acked.
    pending: HashMap<String, (String, EventEnvelope)>,
}

#[derive(Default)]
struct StreamState {
    entries: Vec<(String, EventEnvelope)>,
    groups: HashMap<String, GroupState>,
    counter: u64,
}

/// Process-local fabric with the same group/pending/ack semantics as the
/// Redis adapter. Backs the integration tests and Redis-less runs; reads
/// never block.
#[derive(Default)]
pub struct MemoryStreamFabric {
    streams: Mutex<HashMap<String, StreamState>>,
}

impl MemoryStreamFabric {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test helper: entries appended to a stream so far.
    pub fn published(&self, stream: &str) -> Vec<EventEnvelope> {
        self.streams
            .lock()
            .unwrap()
            .get(stream)
            .map(|s| s.entries.iter().map(|(_, e)| e.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventBus for MemoryStreamFabric {
    async fn publish(&self, stream: &str, envelope: &EventEnvelope) -> Result<(), AppError> {
        let mut streams = self.streams.lock().unwrap();
        let state = streams.entry(stream.to_string()).or_default();
        state.counter += 1;
        let id = format!("{}-0", state.counter);
        state.entries.push((id, envelope.clone()));
        Ok(())
    }
}

#[async_trait]
impl EventStream for MemoryStreamFabric {
    async fn ensure_group(&self, stream: &str, group: &str) -> Result<(), AppError> {
        let mut streams = self.streams.lock().unwrap();
        let state = streams.entry(stream.to_string()).or_default();
        state.groups.entry(group.to_string()).or_default();
        Ok(())
    }

    async fn read_new(
        &self,
        stream: &str,
        group: &str,
        consumer: &str,
        count: usize,
        _block_ms: u64,
    ) -> Result<Vec<StreamMessage>, AppError> {
        let mut streams = self.streams.lock().unwrap();
        let state = streams.entry(stream.to_string()).or_default();
        let entries: Vec<(String, EventEnvelope)> = state.entries.clone();
        let group_state = state.groups.entry(group.to_string()).or_default();

        let mut messages = Vec::new();
        while group_state.next_index < entries.len() && messages.len() < count {
            let (id, envelope) = entries[group_state.next_index].clone();
            group_state
                .pending
                .insert(id.clone(), (consumer.to_string(), envelope.clone()));
            group_state.next_index += 1;
            messages.push(StreamMessage { id, envelope });
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
        let mut streams = self.streams.lock().unwrap();
        let state = streams.entry(stream.to_string()).or_default();
        let group_state = state.groups.entry(group.to_string()).or_default();

        let mut messages: Vec<StreamMessage> = group_state
            .pending
            .iter()
            .filter(|(_, (owner, _))| owner == consumer)
            .take(count)
            .map(|(id, (_, envelope))| StreamMessage {
                id: id.clone(),
                envelope: envelope.clone(),
            })
            .collect();
        messages.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(messages)
    }

    async fn ack(&self, stream: &str, group: &str, message_id: &str) -> Result<(), AppError> {
        let mut streams = self.streams.lock().unwrap();
        if let Some(state) = streams.get_mut(stream) {
            if let Some(group_state) = state.groups.get_mut(group) {
                group_state.pending.remove(message_id);
            }
        }
        Ok(())
    }
}
