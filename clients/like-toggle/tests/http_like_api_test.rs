//! HttpLikeApi against a mocked like-service.

use chrono::Utc;
use like_schema::{EntityRef, EventEnvelope, LikeChangedEvent, LikeSnapshot, LikeToggleResponse};
use like_toggle::{
    ApiError, HttpLikeApi, HttpLikeApiConfig, LikeApi, ToggleController, ToggleOutcome,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "test-token";

fn api(server: &MockServer) -> HttpLikeApi {
    HttpLikeApi::new(HttpLikeApiConfig::new(server.uri()).with_token(TOKEN)).unwrap()
}

#[tokio::test]
async fn test_like_sends_bearer_and_reads_count() {
    let server = MockServer::start().await;
    let post_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/posts/{}/like", post_id)))
        .and(header("Authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "likesCount": 1,
            "countedAt": "2024-05-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = api(&server).like(EntityRef::post(post_id)).await.unwrap();
    assert_eq!(
        response,
        Some(LikeToggleResponse {
            likes_count: 1,
            counted_at: "2024-05-01T10:00:00Z".parse().unwrap(),
        })
    );
}

#[tokio::test]
async fn test_unlike_comment_uses_delete() {
    let server = MockServer::start().await;
    let comment_id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path(format!("/comments/{}/like", comment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "likesCount": 0,
            "countedAt": Utc::now()
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = api(&server)
        .unlike(EntityRef::comment(comment_id))
        .await
        .unwrap();
    assert_eq!(response.map(|r| r.likes_count), Some(0));
}

#[tokio::test]
async fn test_accepted_without_body_has_no_count() {
    let server = MockServer::start().await;
    let post_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/posts/{}/like", post_id)))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let response = api(&server).like(EntityRef::post(post_id)).await.unwrap();
    assert_eq!(response, None);
}

#[tokio::test]
async fn test_rejections_map_to_error_variants() {
    let server = MockServer::start().await;
    let liked = Uuid::new_v4();
    let missing = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/posts/{}/like", liked)))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": "post already liked", "status": 400 })),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/posts/{}/like", missing)))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": "Not liked", "status": 404 })),
        )
        .mount(&server)
        .await;

    let api = api(&server);
    match api.like(EntityRef::post(liked)).await {
        Err(ApiError::Conflict(message)) => assert_eq!(message, "post already liked"),
        other => panic!("expected conflict, got {:?}", other),
    }
    match api.unlike(EntityRef::post(missing)).await {
        Err(ApiError::NotFound(message)) => assert_eq!(message, "Not liked"),
        other => panic!("expected not found, got {:?}", other),
    }
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    let post_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path(format!("/posts/{}/like", post_id)))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "likesCount": 1, "countedAt": Utc::now() }))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let api = HttpLikeApi::new(
        HttpLikeApiConfig::new(server.uri()).with_timeout(Duration::from_millis(50)),
    )
    .unwrap();

    let err = api.like(EntityRef::post(post_id)).await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
}

#[tokio::test]
async fn test_controller_rolls_back_on_server_error() {
    let server = MockServer::start().await;
    let post_id = Uuid::new_v4();
    let entity = EntityRef::post(post_id);

    Mock::given(method("DELETE"))
        .and(path(format!("/posts/{}/like", post_id)))
        .respond_with(ResponseTemplate::new(500).set_body_json(
            json!({ "error": "Internal server error", "status": 500 }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let controller = ToggleController::new(Arc::new(api(&server)), Uuid::new_v4());
    controller.track(entity, LikeSnapshot::new(5, true)).await;

    let outcome = controller.toggle(entity).await;

    assert!(matches!(outcome, ToggleOutcome::RolledBack(_)));
    assert_eq!(controller.snapshot(entity).await, Some(LikeSnapshot::new(5, true)));
}

#[tokio::test]
async fn test_follow_events_reconciles_tracked_entities() {
    let server = MockServer::start().await;
    let tracked = EntityRef::post(Uuid::new_v4());
    let untracked = EntityRef::comment(Uuid::new_v4());
    let viewer = Uuid::new_v4();

    let frame = |entity: EntityRef, likes_count: u64| {
        let envelope = EventEnvelope::new(
            "like-service",
            LikeChangedEvent {
                entity,
                user_id: viewer,
                liked: true,
                likes_count,
                occurred_at: Utc::now(),
            },
        );
        format!("data: {}\n\n", serde_json::to_string(&envelope).unwrap())
    };
    let body = format!("{}{}", frame(tracked, 8), frame(untracked, 2));

    Mock::given(method("GET"))
        .and(path("/events/likes"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .mount(&server)
        .await;

    let api = api(&server);
    let controller = ToggleController::new(Arc::new(api.clone()), viewer);
    controller.track(tracked, LikeSnapshot::new(7, false)).await;

    let applied = api.follow_events(&controller).await.unwrap();

    assert_eq!(applied, 1);
    assert_eq!(controller.snapshot(tracked).await, Some(LikeSnapshot::new(8, true)));
    assert_eq!(controller.snapshot(untracked).await, None);
}
