use chrono::{DateTime, Utc};
use like_schema::{EntityRef, EventEnvelope, LikeChangedEvent};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Source tag stamped on every envelope this service emits
pub const EVENT_SOURCE: &str = "like-service";

pub type LikeEnvelope = EventEnvelope<LikeChangedEvent>;

/// Fan-out of accepted like mutations to connected clients.
///
/// Publishing never blocks or fails the mutation that triggered it: with no
/// subscribers the event is dropped, and a slow subscriber lags instead of
/// applying backpressure.
#[derive(Clone)]
pub struct LikeEventBus {
    sender: broadcast::Sender<LikeEnvelope>,
}

impl LikeEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LikeEnvelope> {
        self.sender.subscribe()
    }

    pub fn publish(
        &self,
        entity: EntityRef,
        user_id: Uuid,
        liked: bool,
        likes_count: u64,
        counted_at: DateTime<Utc>,
    ) {
        let envelope = EventEnvelope::new(
            EVENT_SOURCE,
            LikeChangedEvent {
                entity,
                user_id,
                liked,
                likes_count,
                occurred_at: counted_at,
            },
        );

        match self.sender.send(envelope) {
            Ok(receivers) => {
                tracing::debug!(entity = %entity, receivers, "like event published")
            }
            Err(_) => tracing::trace!(entity = %entity, "like event dropped: no subscribers"),
        }
    }
}
