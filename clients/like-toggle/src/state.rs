//! Per-entity toggle state and its pure reducer.
//!
//! The reducer never performs I/O. It returns the next state together with
//! an [`Effect`] the driver must carry out (send a request, surface a
//! notice).

use like_schema::{EntityRef, LikeChangedEvent, LikeSnapshot, LikeToggleResponse};
use std::fmt;
use uuid::Uuid;

/// Mutation requested by a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Desired {
    Like,
    Unlike,
}

impl Desired {
    /// The mutation that flips `snapshot`.
    pub fn flipping(snapshot: &LikeSnapshot) -> Self {
        if snapshot.is_liked_by_current_user {
            Desired::Unlike
        } else {
            Desired::Like
        }
    }
}

impl fmt::Display for Desired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Desired::Like => f.write_str("like"),
            Desired::Unlike => f.write_str("unlike"),
        }
    }
}

/// Captured at trigger time so a failure can be undone exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleIntent {
    pub entity: EntityRef,
    pub previous: LikeSnapshot,
    pub desired: Desired,
    /// Latest reconciliation event seen while the request was in flight.
    pub deferred_event: Option<LikeChangedEvent>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleState {
    Idle {
        snapshot: LikeSnapshot,
    },
    Pending {
        optimistic: LikeSnapshot,
        intent: ToggleIntent,
    },
}

impl ToggleState {
    pub fn idle(snapshot: LikeSnapshot) -> Self {
        ToggleState::Idle { snapshot }
    }

    /// Snapshot the UI should render right now.
    pub fn displayed(&self) -> LikeSnapshot {
        match self {
            ToggleState::Idle { snapshot } => *snapshot,
            ToggleState::Pending { optimistic, .. } => *optimistic,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ToggleState::Pending { .. })
    }
}

/// User-visible, non-blocking failure notice raised after a rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureNotice {
    pub entity: EntityRef,
    pub desired: Desired,
    pub reason: String,
}

impl fmt::Display for FailureNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Could not {} {}: {}", self.desired, self.entity, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleAction {
    /// The viewer pressed the toggle.
    Trigger,
    /// The mutation was accepted. `response` holds the server's aggregate
    /// when the body carried one.
    Succeeded { response: Option<LikeToggleResponse> },
    /// The mutation failed or timed out.
    Failed { reason: String },
    /// A reconciliation event arrived.
    Remote(LikeChangedEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Issue the mutation to the server.
    Send(Desired),
    /// A trigger arrived while a request was already in flight.
    Ignored,
    Notify(FailureNotice),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: ToggleState,
    pub effect: Effect,
}

impl Transition {
    fn quiet(state: ToggleState) -> Self {
        Self {
            state,
            effect: Effect::None,
        }
    }
}

/// Apply `action` to the toggle state of `entity` as seen by `viewer`.
pub fn reduce(
    entity: EntityRef,
    viewer: Uuid,
    state: ToggleState,
    action: ToggleAction,
) -> Transition {
    match (state, action) {
        (ToggleState::Idle { snapshot }, ToggleAction::Trigger) => {
            let desired = Desired::flipping(&snapshot);
            Transition {
                state: ToggleState::Pending {
                    optimistic: snapshot.toggled(),
                    intent: ToggleIntent {
                        entity,
                        previous: snapshot,
                        desired,
                        deferred_event: None,
                    },
                },
                effect: Effect::Send(desired),
            }
        }
        (pending @ ToggleState::Pending { .. }, ToggleAction::Trigger) => Transition {
            state: pending,
            effect: Effect::Ignored,
        },

        (ToggleState::Pending { optimistic, intent }, ToggleAction::Succeeded { response }) => {
            let deferred = intent.deferred_event.as_ref();
            let settled = match response {
                Some(response) => {
                    let confirmed = LikeSnapshot::new(
                        response.likes_count,
                        optimistic.is_liked_by_current_user,
                    );
                    // The newer of the two counts wins.
                    apply_event(
                        confirmed,
                        viewer,
                        deferred.filter(|event| event.supersedes(&response)),
                    )
                }
                None => apply_event(optimistic, viewer, deferred),
            };
            Transition::quiet(ToggleState::idle(settled))
        }
        (ToggleState::Pending { intent, .. }, ToggleAction::Failed { reason }) => {
            let restored = apply_event(intent.previous, viewer, intent.deferred_event.as_ref());
            Transition {
                state: ToggleState::idle(restored),
                effect: Effect::Notify(FailureNotice {
                    entity,
                    desired: intent.desired,
                    reason,
                }),
            }
        }
        // A completion with nothing in flight is stale.
        (idle @ ToggleState::Idle { .. }, ToggleAction::Succeeded { .. })
        | (idle @ ToggleState::Idle { .. }, ToggleAction::Failed { .. }) => Transition::quiet(idle),

        (state, ToggleAction::Remote(event)) if event.entity != entity => Transition::quiet(state),
        (ToggleState::Idle { snapshot }, ToggleAction::Remote(event)) => {
            Transition::quiet(ToggleState::idle(apply_event(snapshot, viewer, Some(&event))))
        }
        (ToggleState::Pending { optimistic, mut intent }, ToggleAction::Remote(event)) => {
            intent.deferred_event = Some(event);
            Transition::quiet(ToggleState::Pending { optimistic, intent })
        }
    }
}

fn apply_event(
    snapshot: LikeSnapshot,
    viewer: Uuid,
    event: Option<&LikeChangedEvent>,
) -> LikeSnapshot {
    let Some(event) = event else {
        return snapshot;
    };
    let liked = if event.user_id == viewer {
        event.liked
    } else {
        snapshot.is_liked_by_current_user
    };
    LikeSnapshot::new(event.likes_count, liked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    fn post() -> EntityRef {
        EntityRef::post(Uuid::from_u128(7))
    }

    fn viewer() -> Uuid {
        Uuid::from_u128(1)
    }

    fn event(user_id: Uuid, liked: bool, likes_count: u64) -> LikeChangedEvent {
        LikeChangedEvent {
            entity: post(),
            user_id,
            liked,
            likes_count,
            occurred_at: Utc::now(),
        }
    }

    fn counted(likes_count: u64, counted_at: DateTime<Utc>) -> ToggleAction {
        ToggleAction::Succeeded {
            response: Some(LikeToggleResponse {
                likes_count,
                counted_at,
            }),
        }
    }

    fn step(state: ToggleState, action: ToggleAction) -> Transition {
        reduce(post(), viewer(), state, action)
    }

    fn pending_from(snapshot: LikeSnapshot) -> ToggleState {
        step(ToggleState::idle(snapshot), ToggleAction::Trigger).state
    }

    #[test]
    fn test_trigger_flips_optimistically() {
        let t = step(
            ToggleState::idle(LikeSnapshot::new(4, false)),
            ToggleAction::Trigger,
        );
        assert_eq!(t.effect, Effect::Send(Desired::Like));
        assert_eq!(t.state.displayed(), LikeSnapshot::new(5, true));

        let t = step(
            ToggleState::idle(LikeSnapshot::new(5, true)),
            ToggleAction::Trigger,
        );
        assert_eq!(t.effect, Effect::Send(Desired::Unlike));
        assert_eq!(t.state.displayed(), LikeSnapshot::new(4, false));
    }

    #[test]
    fn test_unlike_at_zero_does_not_underflow() {
        let t = step(
            ToggleState::idle(LikeSnapshot::new(0, true)),
            ToggleAction::Trigger,
        );
        assert_eq!(t.state.displayed(), LikeSnapshot::new(0, false));
    }

    #[test]
    fn test_trigger_while_pending_is_ignored() {
        let pending = pending_from(LikeSnapshot::new(4, false));
        let t = step(pending.clone(), ToggleAction::Trigger);
        assert_eq!(t.effect, Effect::Ignored);
        assert_eq!(t.state, pending);
    }

    #[test]
    fn test_success_keeps_optimistic_state() {
        let pending = pending_from(LikeSnapshot::new(4, false));
        let t = step(pending, ToggleAction::Succeeded { response: None });
        assert_eq!(t.effect, Effect::None);
        assert_eq!(t.state, ToggleState::idle(LikeSnapshot::new(5, true)));
    }

    #[test]
    fn test_success_count_supersedes_arithmetic() {
        let pending = pending_from(LikeSnapshot::new(4, false));
        let t = step(pending, counted(9, Utc::now()));
        assert_eq!(t.state, ToggleState::idle(LikeSnapshot::new(9, true)));
    }

    #[test]
    fn test_failure_restores_previous_exactly() {
        let before = LikeSnapshot::new(5, true);
        let pending = pending_from(before);
        let t = step(
            pending,
            ToggleAction::Failed {
                reason: "Not liked".to_string(),
            },
        );
        assert_eq!(t.state, ToggleState::idle(before));
        match t.effect {
            Effect::Notify(notice) => {
                assert_eq!(notice.entity, post());
                assert_eq!(notice.desired, Desired::Unlike);
                assert_eq!(notice.reason, "Not liked");
            }
            other => panic!("expected notice, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_completion_is_noop() {
        let idle = ToggleState::idle(LikeSnapshot::new(2, false));
        let t = step(idle.clone(), counted(8, Utc::now()));
        assert_eq!(t.state, idle);
        let t = step(
            idle.clone(),
            ToggleAction::Failed {
                reason: "late".into(),
            },
        );
        assert_eq!(t.state, idle);
        assert_eq!(t.effect, Effect::None);
    }

    #[test]
    fn test_remote_event_in_idle() {
        let idle = ToggleState::idle(LikeSnapshot::new(2, false));

        let other = step(idle.clone(), ToggleAction::Remote(event(Uuid::from_u128(2), true, 3)));
        assert_eq!(other.state, ToggleState::idle(LikeSnapshot::new(3, false)));

        let own = step(idle, ToggleAction::Remote(event(viewer(), true, 3)));
        assert_eq!(own.state, ToggleState::idle(LikeSnapshot::new(3, true)));
    }

    #[test]
    fn test_remote_event_for_other_entity_is_dropped() {
        let idle = ToggleState::idle(LikeSnapshot::new(2, false));
        let mut foreign = event(Uuid::from_u128(2), true, 40);
        foreign.entity = EntityRef::comment(Uuid::from_u128(7));
        let t = step(idle.clone(), ToggleAction::Remote(foreign));
        assert_eq!(t.state, idle);
    }

    #[test]
    fn test_remote_event_while_pending_is_deferred() {
        let pending = pending_from(LikeSnapshot::new(2, false));
        let held = event(Uuid::from_u128(2), true, 3);
        let occurred_at = held.occurred_at;
        let t = step(pending, ToggleAction::Remote(held));
        assert_eq!(t.state.displayed(), LikeSnapshot::new(3, true));
        assert!(t.state.is_pending());

        // Applied after a success without a count.
        let done = step(t.state.clone(), ToggleAction::Succeeded { response: None });
        assert_eq!(done.state, ToggleState::idle(LikeSnapshot::new(3, true)));

        // Ignored after a success counted later than the event.
        let done = step(
            t.state.clone(),
            counted(4, occurred_at + Duration::milliseconds(5)),
        );
        assert_eq!(done.state, ToggleState::idle(LikeSnapshot::new(4, true)));

        // Applied on top of the rollback.
        let done = step(
            t.state,
            ToggleAction::Failed {
                reason: "timeout".into(),
            },
        );
        assert_eq!(done.state, ToggleState::idle(LikeSnapshot::new(3, false)));
    }

    #[test]
    fn test_only_latest_deferred_event_is_kept() {
        let pending = pending_from(LikeSnapshot::new(2, false));
        let t = step(pending, ToggleAction::Remote(event(Uuid::from_u128(2), true, 3)));
        let t = step(t.state, ToggleAction::Remote(event(Uuid::from_u128(3), true, 4)));
        let done = step(t.state, ToggleAction::Succeeded { response: None });
        assert_eq!(done.state, ToggleState::idle(LikeSnapshot::new(4, true)));
    }

    #[test]
    fn test_event_counted_after_response_wins() {
        // Another user's like lands between our count and our response.
        let counted_at = Utc::now();
        let pending = pending_from(LikeSnapshot::new(0, false));
        let mut later = event(Uuid::from_u128(2), true, 2);
        later.occurred_at = counted_at + Duration::milliseconds(5);

        let t = step(pending, ToggleAction::Remote(later));
        let done = step(t.state, counted(1, counted_at));

        assert_eq!(done.effect, Effect::None);
        assert_eq!(done.state, ToggleState::idle(LikeSnapshot::new(2, true)));
    }

    #[test]
    fn test_event_sharing_response_timestamp_loses() {
        // Our own mutation echoed back with the response's timestamp.
        let counted_at = Utc::now();
        let pending = pending_from(LikeSnapshot::new(3, false));
        let mut echo = event(viewer(), true, 4);
        echo.occurred_at = counted_at;

        let t = step(pending, ToggleAction::Remote(echo));
        let done = step(t.state, counted(4, counted_at));
        assert_eq!(done.state, ToggleState::idle(LikeSnapshot::new(4, true)));

        // A later unlike by the viewer elsewhere also flips the flag.
        let pending = pending_from(LikeSnapshot::new(3, false));
        let mut elsewhere = event(viewer(), false, 3);
        elsewhere.occurred_at = counted_at + Duration::milliseconds(1);
        let t = step(pending, ToggleAction::Remote(elsewhere));
        let done = step(t.state, counted(4, counted_at));
        assert_eq!(done.state, ToggleState::idle(LikeSnapshot::new(3, false)));
    }

    #[test]
    fn test_notice_message() {
        let notice = FailureNotice {
            entity: post(),
            desired: Desired::Like,
            reason: "Already liked".into(),
        };
        assert_eq!(
            notice.to_string(),
            format!("Could not like post:{}: Already liked", Uuid::from_u128(7))
        );
    }
}
