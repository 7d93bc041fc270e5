use crate::domain::ports::{EventHandler, EventStream, StreamMessage};
use crate::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

const READ_COUNT: usize = 10;
const BLOCK_MS: u64 = 5000;

/// One consumer-group member: reclaims its pending entries on startup, then
/// reads new messages, acking each only after the handler returns success.
/// Failed messages stay pending and are retried on the next pass.
pub struct EventConsumer {
    fabric: Arc<dyn EventStream>,
    handler: Arc<dyn EventHandler>,
    stream: String,
    group: String,
    consumer: String,
}

impl EventConsumer {
    pub fn new(
        fabric: Arc<dyn EventStream>,
        handler: Arc<dyn EventHandler>,
        stream: &str,
        group: &str,
        consumer: &str,
    ) -> Self {
        Self {
            fabric,
            handler,
            stream: stream.to_string(),
            group: group.to_string(),
            consumer: consumer.to_string(),
        }
    }

    /// Processes whatever is pending or ready right now. Returns the number
    /// of messages handled successfully.
    pub async fn drain_once(&self) -> Result<usize, AppError> {
        self.fabric.ensure_group(&self.stream, &self.group).await?;
        let mut handled = 0;

        let pending = self
            .fabric
            .read_pending(&self.stream, &self.group, &self.consumer, READ_COUNT)
            .await?;
        handled += self.process(pending).await;

        loop {
            let batch = self
                .fabric
                .read_new(&self.stream, &self.group, &self.consumer, READ_COUNT, 0)
                .await?;
            if batch.is_empty() {
                break;
            }
            handled += self.process(batch).await;
        }
        Ok(handled)
    }

    /// Blocking consumption loop. Finishes the in-flight batch before
    /// honoring the shutdown signal.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        loop {
            match self.fabric.ensure_group(&self.stream, &self.group).await {
                Ok(()) => break,
                Err(e) => {
                    error!(stream = %self.stream, group = %self.group, "consumer group setup failed: {}", e);
                    sleep(Duration::from_secs(1)).await;
                }
            }
            if *shutdown.borrow() {
                return;
            }
        }

        match self
            .fabric
            .read_pending(&self.stream, &self.group, &self.consumer, READ_COUNT)
            .await
        {
            Ok(pending) if !pending.is_empty() => {
                info!(stream = %self.stream, count = pending.len(), "reprocessing pending messages");
                self.process(pending).await;
            }
            Ok(_) => {}
            Err(e) => error!(stream = %self.stream, "pending read failed: {}", e),
        }

        info!(stream = %self.stream, group = %self.group, consumer = %self.consumer, "consumer started");

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = shutdown.changed() => {}
                result = self.fabric.read_new(&self.stream, &self.group, &self.consumer, READ_COUNT, BLOCK_MS) => {
                    match result {
                        Ok(batch) if batch.is_empty() => {
                            // In-memory fabric returns immediately; avoid spinning.
                            sleep(Duration::from_millis(100)).await;
                        }
                        Ok(batch) => {
                            self.process(batch).await;
                        }
                        Err(e) => {
                            error!(stream = %self.stream, "consumer read failed: {}", e);
                            sleep(Duration::from_secs(1)).await;
                        }
                    }
                }
            }
        }

        info!(stream = %self.stream, group = %self.group, "consumer stopped");
    }

    async fn process(&self, batch: Vec<StreamMessage>) -> usize {
        let mut handled = 0;
        for message in batch {
            match self.handler.handle(&message.envelope).await {
                Ok(()) => {
                    handled += 1;
                    if let Err(e) = self.fabric.ack(&self.stream, &self.group, &message.id).await {
                        warn!(message_id = %message.id, "ack failed, message will be redelivered: {}", e);
                    }
                }
                Err(e) => {
                    // Left unacked: redelivered via the pending set.
                    error!(
                        message_id = %message.id,
                        event_type = %message.envelope.event_type,
                        "handler failed: {}", e
                    );
                }
            }
        }
        handled
    }
}
