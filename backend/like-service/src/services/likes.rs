use chrono::Utc;
use like_schema::{EntityRef, LikeToggleResponse};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use super::events::LikeEventBus;
use crate::repository::{LikeStore, StoreResult};

/// Like/unlike orchestration: store mutation, fresh count, event.
///
/// Store errors are returned unchanged; nothing here retries or recovers.
#[derive(Clone)]
pub struct LikeService {
    store: Arc<dyn LikeStore>,
    events: LikeEventBus,
}

impl LikeService {
    pub fn new(store: Arc<dyn LikeStore>, events: LikeEventBus) -> Self {
        Self { store, events }
    }

    pub async fn like(&self, user_id: Uuid, entity: EntityRef) -> StoreResult<LikeToggleResponse> {
        let edge = self.store.like(user_id, entity).await?;
        let counted_at = Utc::now();
        let likes_count = self.store.count_likes(entity).await?;

        info!(
            user_id = %user_id,
            entity = %entity,
            like_id = %edge.id,
            likes_count,
            "like created"
        );
        self.events.publish(entity, user_id, true, likes_count, counted_at);

        Ok(LikeToggleResponse {
            likes_count,
            counted_at,
        })
    }

    pub async fn unlike(
        &self,
        user_id: Uuid,
        entity: EntityRef,
    ) -> StoreResult<LikeToggleResponse> {
        self.store.unlike(user_id, entity).await?;
        let counted_at = Utc::now();
        let likes_count = self.store.count_likes(entity).await?;

        info!(user_id = %user_id, entity = %entity, likes_count, "like removed");
        self.events.publish(entity, user_id, false, likes_count, counted_at);

        Ok(LikeToggleResponse {
            likes_count,
            counted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryStore, StoreError};

    async fn setup() -> (LikeService, Arc<InMemoryStore>, LikeEventBus, Uuid, EntityRef) {
        let store = Arc::new(InMemoryStore::new());
        let user = store.add_user("Juan").await;
        let post = store.add_post(user, None, "hola").await.unwrap();
        let events = LikeEventBus::new(16);
        let service = LikeService::new(store.clone(), events.clone());
        (service, store, events, user, EntityRef::post(post.id))
    }

    #[tokio::test]
    async fn test_like_returns_fresh_count_and_publishes() {
        let (service, _, events, user, entity) = setup().await;
        let mut rx = events.subscribe();

        let response = service.like(user, entity).await.unwrap();
        assert_eq!(response.likes_count, 1);

        let event = rx.recv().await.unwrap().data;
        assert_eq!(event.entity, entity);
        assert!(event.liked);
        assert_eq!(event.likes_count, 1);
    }

    #[tokio::test]
    async fn test_failed_like_publishes_nothing() {
        let (service, _, events, user, entity) = setup().await;
        service.like(user, entity).await.unwrap();
        let mut rx = events.subscribe();

        let err = service.like(user, entity).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unlike_round_trip() {
        let (service, store, _, user, entity) = setup().await;

        service.like(user, entity).await.unwrap();
        let response = service.unlike(user, entity).await.unwrap();

        assert_eq!(response.likes_count, 0);
        assert!(!store.is_liked_by(user, entity).await.unwrap());
    }

    #[tokio::test]
    async fn test_response_and_event_share_count_timestamp() {
        let (service, _, events, user, entity) = setup().await;
        let mut rx = events.subscribe();

        let response = service.like(user, entity).await.unwrap();
        let event = rx.recv().await.unwrap().data;

        assert_eq!(event.occurred_at, response.counted_at);
        assert!(!event.supersedes(&response));
    }
}
