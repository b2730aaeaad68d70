/// Post read handlers
///
/// Public endpoints: an authenticated viewer only changes
/// `isLikedByCurrentUser`.
use actix_web::{web, HttpResponse};
use uuid::Uuid;

use crate::domain::PostListResponse;
use crate::error::Result;
use crate::middleware::UserId;
use crate::state::AppState;

/// List all posts, newest first
pub async fn list_posts(
    state: web::Data<AppState>,
    viewer: Option<UserId>,
) -> Result<HttpResponse> {
    let posts = state.content.list_posts(viewer.map(|v| v.0)).await?;
    Ok(HttpResponse::Ok().json(PostListResponse { posts }))
}

/// Get a post by ID
pub async fn get_post(
    state: web::Data<AppState>,
    viewer: Option<UserId>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = state
        .content
        .get_post(post_id.into_inner(), viewer.map(|v| v.0))
        .await?;
    Ok(HttpResponse::Ok().json(post))
}

/// Get posts for a user
pub async fn get_user_posts(
    state: web::Data<AppState>,
    viewer: Option<UserId>,
    user_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let posts = state
        .content
        .list_posts_by_author(user_id.into_inner(), viewer.map(|v| v.0))
        .await?;
    Ok(HttpResponse::Ok().json(PostListResponse { posts }))
}
