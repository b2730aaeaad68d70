//! Async driver for the toggle reducer.

use like_schema::{
    is_compatible, EntityRef, EventEnvelope, LikeChangedEvent, LikeSnapshot, SCHEMA_VERSION,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::LikeApi;
use crate::state::{reduce, Desired, Effect, FailureNotice, ToggleAction, ToggleState};

const NOTICE_CAPACITY: usize = 64;

/// Result of a single [`ToggleController::toggle`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The server accepted the mutation; the entity now displays this.
    Confirmed(LikeSnapshot),
    /// The request failed and the pre-toggle snapshot was restored.
    RolledBack(FailureNotice),
    /// A request for this entity was already in flight.
    Ignored,
    /// The entity was never tracked.
    Untracked,
}

/// Optimistic like toggles for one viewer.
///
/// Holds one [`ToggleState`] per tracked entity. At most one mutation per
/// entity is in flight; distinct entities toggle concurrently. The state lock
/// is never held across a request.
pub struct ToggleController<A> {
    api: Arc<A>,
    viewer: Uuid,
    entries: Mutex<HashMap<EntityRef, ToggleState>>,
    notices: broadcast::Sender<FailureNotice>,
}

impl<A: LikeApi> ToggleController<A> {
    pub fn new(api: Arc<A>, viewer: Uuid) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            api,
            viewer,
            entries: Mutex::new(HashMap::new()),
            notices,
        }
    }

    /// Start tracking `entity` with a server-rendered snapshot.
    ///
    /// A fresh snapshot replaces an idle entry. Returns `false` and leaves the
    /// entry alone while a toggle is in flight.
    pub async fn track(&self, entity: EntityRef, snapshot: LikeSnapshot) -> bool {
        let mut entries = self.entries.lock().await;
        match entries.get(&entity) {
            Some(state) if state.is_pending() => false,
            _ => {
                entries.insert(entity, ToggleState::idle(snapshot));
                true
            }
        }
    }

    /// Snapshot currently displayed for `entity`.
    pub async fn snapshot(&self, entity: EntityRef) -> Option<LikeSnapshot> {
        self.entries
            .lock()
            .await
            .get(&entity)
            .map(ToggleState::displayed)
    }

    pub async fn is_pending(&self, entity: EntityRef) -> bool {
        self.entries
            .lock()
            .await
            .get(&entity)
            .is_some_and(ToggleState::is_pending)
    }

    /// Failure notices raised by rollbacks.
    pub fn subscribe_notices(&self) -> broadcast::Receiver<FailureNotice> {
        self.notices.subscribe()
    }

    /// Flip the viewer's like on `entity` and drive the request to completion.
    pub async fn toggle(&self, entity: EntityRef) -> ToggleOutcome {
        let desired = match self.step(entity, ToggleAction::Trigger).await {
            None => return ToggleOutcome::Untracked,
            Some(Effect::Send(desired)) => desired,
            Some(_) => {
                debug!(entity = %entity, "Toggle ignored, request already in flight");
                return ToggleOutcome::Ignored;
            }
        };

        let result = match desired {
            Desired::Like => self.api.like(entity).await,
            Desired::Unlike => self.api.unlike(entity).await,
        };

        let action = match result {
            Ok(response) => ToggleAction::Succeeded { response },
            Err(e) => {
                warn!(
                    user_id = %self.viewer,
                    entity = %entity,
                    action = %desired,
                    timeout = e.is_timeout(),
                    error = %e,
                    "Like toggle failed, rolling back"
                );
                ToggleAction::Failed {
                    reason: e.to_string(),
                }
            }
        };

        match self.step(entity, action).await {
            Some(Effect::Notify(notice)) => {
                // No receivers is fine; the notice is advisory.
                let _ = self.notices.send(notice.clone());
                ToggleOutcome::RolledBack(notice)
            }
            Some(_) => {
                let shown = self.snapshot(entity).await.unwrap_or_default();
                info!(
                    user_id = %self.viewer,
                    entity = %entity,
                    action = %desired,
                    likes_count = shown.likes_count,
                    "Like toggle confirmed"
                );
                ToggleOutcome::Confirmed(shown)
            }
            None => ToggleOutcome::Untracked,
        }
    }

    /// Reconcile with a server-broadcast like event.
    ///
    /// Returns `false` when the event is incompatible or concerns an entity
    /// that is not tracked.
    pub async fn apply_event(&self, envelope: &EventEnvelope<LikeChangedEvent>) -> bool {
        if !is_compatible(SCHEMA_VERSION, envelope.schema_version) {
            warn!(
                event_id = %envelope.event_id,
                schema_version = envelope.schema_version,
                "Dropping like event with incompatible schema"
            );
            return false;
        }

        let entity = envelope.data.entity;
        self.step(entity, ToggleAction::Remote(envelope.data.clone()))
            .await
            .is_some()
    }

    async fn step(&self, entity: EntityRef, action: ToggleAction) -> Option<Effect> {
        let mut entries = self.entries.lock().await;
        let state = entries.get(&entity)?.clone();
        let transition = reduce(entity, self.viewer, state, action);
        entries.insert(entity, transition.state);
        Some(transition.effect)
    }
}
