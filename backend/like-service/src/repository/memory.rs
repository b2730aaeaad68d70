use async_trait::async_trait;
use chrono::Utc;
use like_schema::{EntityKind, EntityRef, LikeSnapshot};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContentStore, LikeStore, StoreError, StoreResult};
use crate::domain::{projection, CommentRecord, LikeEdge, PostRecord};

#[derive(Default)]
struct Inner {
    users: HashMap<Uuid, String>,
    /// Insertion order; iterated in reverse for newest-first reads
    posts: Vec<PostRecord>,
    comments: Vec<CommentRecord>,
    /// Keyed by the uniqueness key (user, entity)
    likes: HashMap<(Uuid, EntityRef), LikeEdge>,
}

impl Inner {
    fn entity_exists(&self, entity: EntityRef) -> bool {
        match entity.kind {
            EntityKind::Post => self.posts.iter().any(|p| p.id == entity.id),
            EntityKind::Comment => self.comments.iter().any(|c| c.id == entity.id),
        }
    }

    fn likers(&self, entity: EntityRef) -> impl Iterator<Item = Uuid> + '_ {
        self.likes
            .keys()
            .filter(move |(_, e)| *e == entity)
            .map(|(user_id, _)| *user_id)
    }
}

/// Ids of the rows created by [`InMemoryStore::seed_demo`]
#[derive(Debug, Clone, Copy)]
pub struct DemoSeed {
    pub author_id: Uuid,
    pub reader_id: Uuid,
    pub post_id: Uuid,
    pub comment_id: Uuid,
}

/// In-process store with the same contract as the Postgres repositories.
///
/// Every mutation runs under one write lock, which is what makes the
/// (user, entity) check-and-insert atomic.
#[derive(Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.inner.write().await.users.insert(id, name.to_string());
        id
    }

    pub async fn add_post(
        &self,
        author_id: Uuid,
        title: Option<&str>,
        content: &str,
    ) -> StoreResult<PostRecord> {
        let mut inner = self.inner.write().await;
        let author_name = inner
            .users
            .get(&author_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {} not found", author_id)))?;

        let post = PostRecord {
            id: Uuid::new_v4(),
            author_id,
            author_name,
            title: title.map(str::to_string),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        inner.posts.push(post.clone());
        Ok(post)
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> StoreResult<CommentRecord> {
        let mut inner = self.inner.write().await;
        if !inner.entity_exists(EntityRef::post(post_id)) {
            return Err(StoreError::NotFound(format!("post {} not found", post_id)));
        }
        let author_name = inner
            .users
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("user {} not found", user_id)))?;

        let comment = CommentRecord {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            author_name,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        inner.comments.push(comment.clone());
        Ok(comment)
    }

    /// Populate an empty store with two users, a post and a comment so the
    /// memory backend is usable on its own.
    pub async fn seed_demo(&self) -> StoreResult<DemoSeed> {
        let author_id = self.add_user("Demo Author").await;
        let reader_id = self.add_user("Demo Reader").await;
        let post = self
            .add_post(author_id, Some("Welcome"), "First post on the demo store")
            .await?;
        let comment = self
            .add_comment(post.id, reader_id, "Nice to see this running")
            .await?;

        Ok(DemoSeed {
            author_id,
            reader_id,
            post_id: post.id,
            comment_id: comment.id,
        })
    }

    /// Delete a post with its comments and every like pointing at either,
    /// mirroring the cascading foreign keys of the SQL schema.
    pub async fn remove_post(&self, post_id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        let before = inner.posts.len();
        inner.posts.retain(|p| p.id != post_id);
        if inner.posts.len() == before {
            return false;
        }

        let orphaned: Vec<Uuid> = inner
            .comments
            .iter()
            .filter(|c| c.post_id == post_id)
            .map(|c| c.id)
            .collect();
        inner.comments.retain(|c| c.post_id != post_id);
        inner.likes.retain(|(_, entity), _| match entity.kind {
            EntityKind::Post => entity.id != post_id,
            EntityKind::Comment => !orphaned.contains(&entity.id),
        });
        true
    }

    /// Number of edges held for one (user, entity) pair; 0 or 1.
    pub async fn edge_count(&self, user_id: Uuid, entity: EntityRef) -> usize {
        let inner = self.inner.read().await;
        inner
            .likes
            .values()
            .filter(|edge| edge.user_id == user_id && edge.entity == entity)
            .count()
    }
}

#[async_trait]
impl LikeStore for InMemoryStore {
    async fn like(&self, user_id: Uuid, entity: EntityRef) -> StoreResult<LikeEdge> {
        let mut inner = self.inner.write().await;
        if !inner.entity_exists(entity) {
            return Err(StoreError::NotFound(format!(
                "{} {} not found",
                entity.kind, entity.id
            )));
        }
        if !inner.users.contains_key(&user_id) {
            return Err(StoreError::UnknownUser(user_id));
        }
        if inner.likes.contains_key(&(user_id, entity)) {
            return Err(StoreError::Conflict(format!("{} already liked", entity.kind)));
        }

        let edge = LikeEdge {
            id: Uuid::new_v4(),
            user_id,
            entity,
            created_at: Utc::now(),
        };
        inner.likes.insert((user_id, entity), edge.clone());
        Ok(edge)
    }

    async fn unlike(&self, user_id: Uuid, entity: EntityRef) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        match inner.likes.remove(&(user_id, entity)) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(format!(
                "{} {} is not liked",
                entity.kind, entity.id
            ))),
        }
    }

    async fn count_likes(&self, entity: EntityRef) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.likers(entity).count() as u64)
    }

    async fn is_liked_by(&self, user_id: Uuid, entity: EntityRef) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner.likes.contains_key(&(user_id, entity)))
    }

    async fn snapshots(
        &self,
        viewer: Option<Uuid>,
        entities: &[EntityRef],
    ) -> StoreResult<HashMap<EntityRef, LikeSnapshot>> {
        let inner = self.inner.read().await;
        Ok(entities
            .iter()
            .map(|entity| {
                (
                    *entity,
                    projection::to_snapshot_view(inner.likers(*entity), viewer),
                )
            })
            .collect())
    }
}

#[async_trait]
impl ContentStore for InMemoryStore {
    async fn list_posts(&self) -> StoreResult<Vec<PostRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.posts.iter().rev().cloned().collect())
    }

    async fn list_posts_by_author(&self, author_id: Uuid) -> StoreResult<Vec<PostRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .posts
            .iter()
            .rev()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect())
    }

    async fn get_post(&self, post_id: Uuid) -> StoreResult<Option<PostRecord>> {
        let inner = self.inner.read().await;
        Ok(inner.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<CommentRecord>> {
        let inner = self.inner.read().await;
        Ok(inner
            .comments
            .iter()
            .rev()
            .filter(|c| c.post_id == post_id)
            .cloned()
            .collect())
    }

    async fn comment_counts(&self, post_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, u64>> {
        let inner = self.inner.read().await;
        Ok(post_ids
            .iter()
            .map(|id| {
                let n = inner.comments.iter().filter(|c| c.post_id == *id).count();
                (*id, n as u64)
            })
            .collect())
    }
}
