//! Optimistic like toggles for a single viewer.
//!
//! A [`ToggleController`] keeps the displayed like state of every tracked
//! post or comment. Toggling flips it immediately, sends one request per
//! entity at a time through a [`LikeApi`], and restores the exact pre-toggle
//! state with a [`FailureNotice`] when the request fails. Server-broadcast
//! like events keep idle entries in step with other viewers.

pub mod api;
pub mod controller;
pub mod error;
pub mod events;
pub mod state;

pub use api::{HttpLikeApi, HttpLikeApiConfig, LikeApi};
pub use controller::{ToggleController, ToggleOutcome};
pub use error::{ApiError, Result};
pub use events::SseDecoder;
pub use state::{reduce, Desired, Effect, FailureNotice, ToggleAction, ToggleIntent, ToggleState};
