//! Pure projections from stored rows to the shapes read endpoints return.
//!
//! Nothing here touches a store: callers fetch rows and like facts first,
//! then attach the computed fields.
use like_schema::LikeSnapshot;
use std::collections::HashMap;
use uuid::Uuid;

use super::{AuthorSummary, CommentRecord, CommentView, PostRecord, PostView};
use like_schema::EntityRef;

/// Snapshot of one entity from the ids of the users who liked it.
pub fn to_snapshot_view<I>(likers: I, viewer: Option<Uuid>) -> LikeSnapshot
where
    I: IntoIterator<Item = Uuid>,
{
    let mut snapshot = LikeSnapshot::default();
    for user_id in likers {
        snapshot.likes_count += 1;
        if viewer == Some(user_id) {
            snapshot.is_liked_by_current_user = true;
        }
    }
    snapshot
}

/// Snapshot from an aggregate row; negative counts clamp to zero.
pub fn from_tally(likes_count: i64, liked_by_viewer: bool) -> LikeSnapshot {
    LikeSnapshot::new(u64::try_from(likes_count).unwrap_or(0), liked_by_viewer)
}

pub fn project_post(post: PostRecord, likes: LikeSnapshot, comments_count: u64) -> PostView {
    PostView {
        id: post.id,
        author_id: post.author_id,
        author: AuthorSummary {
            id: post.author_id,
            name: post.author_name,
        },
        title: post.title,
        content: post.content,
        created_at: post.created_at,
        likes,
        comments_count,
    }
}

pub fn project_comment(comment: CommentRecord, likes: LikeSnapshot) -> CommentView {
    CommentView {
        id: comment.id,
        post_id: comment.post_id,
        user_id: comment.user_id,
        user: AuthorSummary {
            id: comment.user_id,
            name: comment.author_name,
        },
        content: comment.content,
        created_at: comment.created_at,
        likes,
    }
}

/// Project a batch of posts, defaulting any missing aggregate to zero.
pub fn project_posts(
    posts: Vec<PostRecord>,
    snapshots: &HashMap<EntityRef, LikeSnapshot>,
    comment_counts: &HashMap<Uuid, u64>,
) -> Vec<PostView> {
    posts
        .into_iter()
        .map(|post| {
            let likes = snapshots
                .get(&EntityRef::post(post.id))
                .copied()
                .unwrap_or_default();
            let comments = comment_counts.get(&post.id).copied().unwrap_or(0);
            project_post(post, likes, comments)
        })
        .collect()
}

pub fn project_comments(
    comments: Vec<CommentRecord>,
    snapshots: &HashMap<EntityRef, LikeSnapshot>,
) -> Vec<CommentView> {
    comments
        .into_iter()
        .map(|comment| {
            let likes = snapshots
                .get(&EntityRef::comment(comment.id))
                .copied()
                .unwrap_or_default();
            project_comment(comment, likes)
        })
        .collect()
}
