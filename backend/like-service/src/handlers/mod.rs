/// HTTP handlers for like-service
///
/// - Likes: like/unlike toggles for posts and comments
/// - Posts, comments: public reads with per-viewer like fields
/// - Events: server-sent stream of accepted like mutations
pub mod comments;
pub mod events;
pub mod likes;
pub mod posts;

use actix_web::web;

pub use comments::list_comments;
pub use events::like_events;
pub use likes::{like_comment, like_post, unlike_comment, unlike_post};
pub use posts::{get_post, get_user_posts, list_posts};

/// Register every like-service route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(|| async { "OK" }))
        .route("/ready", web::get().to(|| async { "READY" }))
        .service(
            web::scope("/posts")
                .route("", web::get().to(list_posts))
                .route("/{id}", web::get().to(get_post))
                .route("/{id}/comments", web::get().to(list_comments))
                .route("/{id}/like", web::post().to(like_post))
                .route("/{id}/like", web::delete().to(unlike_post)),
        )
        .service(
            web::scope("/comments")
                .route("/{id}/like", web::post().to(like_comment))
                .route("/{id}/like", web::delete().to(unlike_comment)),
        )
        .route("/users/{id}/posts", web::get().to(get_user_posts))
        .route("/events/likes", web::get().to(like_events));
}
