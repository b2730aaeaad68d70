//! Store handles for like edges and the content they point at.
//!
//! Handlers only see the traits; `main` decides which implementation backs
//! them and owns its lifecycle.
pub mod content;
pub mod likes;
pub mod memory;

pub use content::ContentRepository;
pub use likes::LikeRepository;
pub use memory::{DemoSeed, InMemoryStore};

use async_trait::async_trait;
use like_schema::{EntityRef, LikeSnapshot};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{CommentRecord, LikeEdge, PostRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    /// Entity or edge absent
    #[error("{0}")]
    NotFound(String),

    /// An edge already exists for the (user, entity) pair
    #[error("{0}")]
    Conflict(String),

    /// The acting user has no row in `users`
    #[error("user {0} is not registered")]
    UnknownUser(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Internal(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Authoritative owner of the "user liked entity" relation.
///
/// Uniqueness of (user, entity) is enforced by the implementation itself, so
/// concurrent `like` calls for one pair resolve to exactly one success and
/// one `Conflict`.
#[async_trait]
pub trait LikeStore: Send + Sync {
    /// Persist a new edge. `NotFound` if the entity does not exist,
    /// `UnknownUser` if the user does not, `Conflict` if the user already
    /// liked it.
    async fn like(&self, user_id: Uuid, entity: EntityRef) -> StoreResult<LikeEdge>;

    /// Remove an edge. `NotFound` if the user has not liked the entity.
    async fn unlike(&self, user_id: Uuid, entity: EntityRef) -> StoreResult<()>;

    /// Live aggregate of edges for the entity.
    async fn count_likes(&self, entity: EntityRef) -> StoreResult<u64>;

    async fn is_liked_by(&self, user_id: Uuid, entity: EntityRef) -> StoreResult<bool>;

    /// Batch form of `count_likes` + `is_liked_by` for list endpoints.
    ///
    /// Every requested entity is present in the result; entities without
    /// edges map to an empty snapshot.
    async fn snapshots(
        &self,
        viewer: Option<Uuid>,
        entities: &[EntityRef],
    ) -> StoreResult<HashMap<EntityRef, LikeSnapshot>>;
}

/// Read-only access to the posts and comments that likes point at.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All posts, newest first
    async fn list_posts(&self) -> StoreResult<Vec<PostRecord>>;

    /// Posts by one author, newest first
    async fn list_posts_by_author(&self, author_id: Uuid) -> StoreResult<Vec<PostRecord>>;

    async fn get_post(&self, post_id: Uuid) -> StoreResult<Option<PostRecord>>;

    /// Comments of a post, newest first
    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<CommentRecord>>;

    /// Live comment counts; posts without comments map to zero.
    async fn comment_counts(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, u64>>;
}

/// Clamp a SQL `COUNT(*)` into the non-negative domain
pub(crate) fn count_from_sql(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
