use chrono::{DateTime, Utc};
/// Wire schema shared by like-service and its clients
///
/// Defines the likeable entity references, the derived like snapshot embedded
/// in read responses, the toggle endpoint bodies, and the versioned
/// reconciliation events broadcast after every accepted like mutation.
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod entity;

pub use entity::{EntityKind, EntityRef, LikeSnapshot, ParseEntityKindError};

/// Current schema version for all events
pub const SCHEMA_VERSION: u32 = 1;

/// Base event envelope for every broadcast event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope<T> {
    /// Unique event ID for idempotency and tracing
    pub event_id: Uuid,
    /// Event timestamp
    pub timestamp: DateTime<Utc>,
    /// Schema version for compatibility checking
    pub schema_version: u32,
    /// Source service that generated the event
    pub source: String,
    /// Correlation ID for distributed tracing
    pub correlation_id: Option<Uuid>,
    /// Actual event payload
    pub data: T,
}

impl<T> EventEnvelope<T> {
    pub fn new(source: impl Into<String>, data: T) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            schema_version: SCHEMA_VERSION,
            source: source.into(),
            correlation_id: None,
            data,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

// ============================================================================
// LIKE EVENTS
// ============================================================================

/// Emitted after a like or unlike has been accepted by the store.
///
/// `likes_count` is the authoritative aggregate right after the mutation and
/// `occurred_at` the server time it was counted at, the same instant the
/// matching [`LikeToggleResponse`] carries as `counted_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeChangedEvent {
    pub entity: EntityRef,
    pub user_id: Uuid,
    pub liked: bool,
    pub likes_count: u64,
    pub occurred_at: DateTime<Utc>,
}

impl LikeChangedEvent {
    /// Whether this event was counted after `response`, making its count the
    /// fresher of the two.
    pub fn supersedes(&self, response: &LikeToggleResponse) -> bool {
        self.occurred_at > response.counted_at
    }
}

// ============================================================================
// HTTP BODIES
// ============================================================================

/// Body returned by the like/unlike endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeToggleResponse {
    pub likes_count: u64,
    /// Server time the count was taken
    pub counted_at: DateTime<Utc>,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub status: u16,
}

// ============================================================================
// Version compatibility helpers
// ============================================================================

pub fn is_compatible(current_version: u32, message_version: u32) -> bool {
    current_version == message_version
}
