use std::sync::Arc;

use crate::repository::{ContentStore, LikeStore};
use crate::services::{ContentService, LikeEventBus, LikeService};

/// Shared handler state, built once by the process entry point
#[derive(Clone)]
pub struct AppState {
    pub likes: LikeService,
    pub content: ContentService,
    pub events: LikeEventBus,
}

impl AppState {
    pub fn new(
        like_store: Arc<dyn LikeStore>,
        content_store: Arc<dyn ContentStore>,
        events: LikeEventBus,
    ) -> Self {
        Self {
            likes: LikeService::new(like_store.clone(), events.clone()),
            content: ContentService::new(content_store, like_store),
            events,
        }
    }
}
