use chrono::{DateTime, Utc};
use like_schema::{EntityRef, LikeSnapshot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// LikeEdge - one user's like of one post or comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeEdge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entity: EntityRef,
    pub created_at: DateTime<Utc>,
}

/// Post row joined with its author's display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PostRecord {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub title: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comment row joined with its author's display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentRecord {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
}

/// Post as returned by read endpoints, with like fields computed per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author: AuthorSummary,
    pub title: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub likes: LikeSnapshot,
    pub comments_count: u64,
}

/// Comment as returned by read endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub user: AuthorSummary,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub likes: LikeSnapshot,
}

/// Response body of `GET /posts/{id}/comments`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentListResponse {
    pub count: usize,
    pub comments: Vec<CommentView>,
}

/// Response body of the post list endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostView>,
}
