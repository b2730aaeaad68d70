use like_schema::EntityRef;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::projection::{project_comments, project_posts};
use crate::domain::{CommentView, PostRecord, PostView};
use crate::repository::{ContentStore, LikeStore, StoreError, StoreResult};

/// Read side: posts and comments with like fields computed at request time.
#[derive(Clone)]
pub struct ContentService {
    content: Arc<dyn ContentStore>,
    likes: Arc<dyn LikeStore>,
}

impl ContentService {
    pub fn new(content: Arc<dyn ContentStore>, likes: Arc<dyn LikeStore>) -> Self {
        Self { content, likes }
    }

    pub async fn list_posts(&self, viewer: Option<Uuid>) -> StoreResult<Vec<PostView>> {
        let posts = self.content.list_posts().await?;
        self.decorate_posts(posts, viewer).await
    }

    pub async fn list_posts_by_author(
        &self,
        author_id: Uuid,
        viewer: Option<Uuid>,
    ) -> StoreResult<Vec<PostView>> {
        let posts = self.content.list_posts_by_author(author_id).await?;
        self.decorate_posts(posts, viewer).await
    }

    pub async fn get_post(&self, post_id: Uuid, viewer: Option<Uuid>) -> StoreResult<PostView> {
        let post = self
            .content
            .get_post(post_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("post {} not found", post_id)))?;

        let mut views = self.decorate_posts(vec![post], viewer).await?;
        views
            .pop()
            .ok_or_else(|| StoreError::Internal("post projection came back empty".to_string()))
    }

    /// Comments of a post; `NotFound` when the post itself does not exist.
    pub async fn list_comments(
        &self,
        post_id: Uuid,
        viewer: Option<Uuid>,
    ) -> StoreResult<Vec<CommentView>> {
        if self.content.get_post(post_id).await?.is_none() {
            return Err(StoreError::NotFound(format!("post {} not found", post_id)));
        }

        let comments = self.content.list_comments(post_id).await?;
        let entities: Vec<EntityRef> = comments.iter().map(|c| EntityRef::comment(c.id)).collect();
        let snapshots = self.likes.snapshots(viewer, &entities).await?;

        Ok(project_comments(comments, &snapshots))
    }

    async fn decorate_posts(
        &self,
        posts: Vec<PostRecord>,
        viewer: Option<Uuid>,
    ) -> StoreResult<Vec<PostView>> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
        let entities: Vec<EntityRef> = post_ids.iter().copied().map(EntityRef::post).collect();

        let snapshots = self.likes.snapshots(viewer, &entities).await?;
        let comment_counts = self.content.comment_counts(&post_ids).await?;

        Ok(project_posts(posts, &snapshots, &comment_counts))
    }
}
