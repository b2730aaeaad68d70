use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::domain::CommentListResponse;
use crate::error::Result;
use crate::middleware::UserId;
use crate::state::AppState;

/// Comments of a post, newest first; 404 when the post is missing
pub async fn list_comments(
    state: web::Data<AppState>,
    viewer: Option<UserId>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let comments = state
        .content
        .list_comments(post_id.into_inner(), viewer.map(|v| v.0))
        .await?;

    Ok(HttpResponse::Ok().json(CommentListResponse {
        count: comments.len(),
        comments,
    }))
}
