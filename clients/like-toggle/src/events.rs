//! Client side of `GET /events/likes`.

use futures_util::StreamExt;
use like_schema::{EventEnvelope, LikeChangedEvent};
use reqwest::Method;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::{error_for_status, HttpLikeApi, LikeApi};
use crate::controller::ToggleController;
use crate::error::{ApiError, Result};

pub const EVENTS_PATH: &str = "/events/likes";
const STREAM_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

pub type LikeEnvelope = EventEnvelope<LikeChangedEvent>;

/// Incremental decoder for `text/event-stream` bodies carrying like events.
///
/// Chunks may split frames and UTF-8 sequences anywhere.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every envelope completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<LikeEnvelope> {
        self.buffer.extend_from_slice(chunk);

        let mut envelopes = Vec::new();
        while let Some(end) = find_frame_end(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(envelope) = decode_frame(&frame[..end]) {
                envelopes.push(envelope);
            }
        }
        envelopes
    }
}

fn find_frame_end(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

fn decode_frame(frame: &[u8]) -> Option<LikeEnvelope> {
    let text = match std::str::from_utf8(frame) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "Skipping non UTF-8 event frame");
            return None;
        }
    };

    let data: Vec<&str> = text
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();
    if data.is_empty() {
        // Comment or keep-alive frame.
        return None;
    }

    match serde_json::from_str::<LikeEnvelope>(&data.join("\n")) {
        Ok(envelope) => Some(envelope),
        Err(e) => {
            warn!(error = %e, "Skipping malformed like event");
            None
        }
    }
}

impl HttpLikeApi {
    /// Subscribe to like events and feed them into `controller` until the
    /// server closes the stream. Returns the number of events applied.
    pub async fn follow_events<A: LikeApi>(&self, controller: &ToggleController<A>) -> Result<u64> {
        // The client-wide timeout would cut a long-lived stream.
        let response = self
            .request(Method::GET, EVENTS_PATH)
            .timeout(STREAM_TIMEOUT)
            .send()
            .await?;
        let response = error_for_status(response).await?;

        let mut decoder = SseDecoder::new();
        let mut stream = response.bytes_stream();
        let mut applied = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ApiError::Stream(e.to_string()))?;
            for envelope in decoder.push(&chunk) {
                if controller.apply_event(&envelope).await {
                    applied += 1;
                } else {
                    debug!(entity = %envelope.data.entity, "Like event for untracked entity");
                }
            }
        }

        Ok(applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use like_schema::EntityRef;
    use uuid::Uuid;

    fn frame(likes_count: u64) -> String {
        let envelope = EventEnvelope::new(
            "like-service",
            LikeChangedEvent {
                entity: EntityRef::post(Uuid::from_u128(5)),
                user_id: Uuid::from_u128(2),
                liked: true,
                likes_count,
                occurred_at: Utc::now(),
            },
        );
        format!("data: {}\n\n", serde_json::to_string(&envelope).unwrap())
    }

    #[test]
    fn test_decodes_whole_frames() {
        let mut decoder = SseDecoder::new();
        let body = format!("{}{}", frame(1), frame(2));
        let events = decoder.push(body.as_bytes());
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data.likes_count, 1);
        assert_eq!(events[1].data.likes_count, 2);
    }

    #[test]
    fn test_decodes_frames_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        let body = frame(3);
        let (head, tail) = body.as_bytes().split_at(body.len() / 2);

        assert!(decoder.push(head).is_empty());
        let events = decoder.push(tail);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data.likes_count, 3);
    }

    #[test]
    fn test_skips_keepalive_and_garbage() {
        let mut decoder = SseDecoder::new();
        let body = format!(": keep-alive\n\ndata: {{not json}}\n\n{}", frame(4));
        let events = decoder.push(body.as_bytes());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data.likes_count, 4);
    }
}
