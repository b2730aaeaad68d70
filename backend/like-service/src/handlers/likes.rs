/// Like toggle handlers - POST and DELETE on `/{posts|comments}/{id}/like`
use actix_web::{web, HttpResponse};
use like_schema::EntityRef;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::UserId;
use crate::state::AppState;

/// Like a post
pub async fn like_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    like(&state, user_id, EntityRef::post(post_id.into_inner())).await
}

/// Remove a like from a post
pub async fn unlike_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    unlike(&state, user_id, EntityRef::post(post_id.into_inner())).await
}

/// Like a comment
pub async fn like_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    like(&state, user_id, EntityRef::comment(comment_id.into_inner())).await
}

/// Remove a like from a comment
pub async fn unlike_comment(
    state: web::Data<AppState>,
    user_id: UserId,
    comment_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    unlike(&state, user_id, EntityRef::comment(comment_id.into_inner())).await
}

async fn like(state: &AppState, user_id: UserId, entity: EntityRef) -> Result<HttpResponse> {
    let response = state.likes.like(user_id.0, entity).await.map_err(|e| {
        tracing::warn!(user_id = %user_id.0, entity = %entity, "like rejected: {}", e);
        e
    })?;

    Ok(HttpResponse::Created().json(response))
}

async fn unlike(state: &AppState, user_id: UserId, entity: EntityRef) -> Result<HttpResponse> {
    let response = state.likes.unlike(user_id.0, entity).await.map_err(|e| {
        tracing::warn!(user_id = %user_id.0, entity = %entity, "unlike rejected: {}", e);
        e
    })?;

    Ok(HttpResponse::Ok().json(response))
}
