use actix_web::http::header::{self, CacheControl, CacheDirective};
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::services::LikeEnvelope;
use crate::state::AppState;

/// Format one envelope as a server-sent event frame
pub fn sse_frame(envelope: &LikeEnvelope) -> serde_json::Result<web::Bytes> {
    let json = serde_json::to_string(envelope)?;
    Ok(web::Bytes::from(format!("data: {}\n\n", json)))
}

/// Stream every accepted like mutation as server-sent events.
///
/// A subscriber that falls behind skips the events it missed; the next
/// event it does see carries an authoritative count anyway.
pub async fn like_events(state: web::Data<AppState>) -> HttpResponse {
    let stream = BroadcastStream::new(state.events.subscribe()).filter_map(|item| async move {
        match item {
            Ok(envelope) => match sse_frame(&envelope) {
                Ok(frame) => Some(Ok::<_, actix_web::Error>(frame)),
                Err(e) => {
                    tracing::error!("failed to encode like event: {}", e);
                    None
                }
            },
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "like event subscriber lagged");
                None
            }
        }
    });

    HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "text/event-stream"))
        .insert_header(CacheControl(vec![CacheDirective::NoCache]))
        .streaming(stream)
}
