use axum::{extract::State, Json};
use tracing::{debug, instrument, warn};

use super::{
    models::NewTrackEvent,
    types::{TrackRequest, TrackResponse},
};
use crate::shared::{AppState, JsonBody};

/// HTTP handler for client event tracking
///
/// POST /api/track
/// Fire-and-forget: a failed insert is logged and still answered with `ok: true`
#[instrument(name = "track_event", skip_all)]
pub async fn track_event(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<TrackRequest>,
) -> Json<TrackResponse> {
    let event = NewTrackEvent::from(request);

    match state.track_repository.insert_event(&event).await {
        Ok(()) => debug!(token = ?event.token, event = ?event.event, "Track event saved"),
        Err(e) => warn!(error = %e, token = ?event.token, "Track event dropped"),
    }

    Json(TrackResponse { ok: true })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::create_router;
    use crate::shared::test_utils::AppStateBuilder;
    use crate::shared::AppError;
    use crate::track::repository::{InMemoryTrackRepository, TrackRepository};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    struct FailingTrackRepository;

    #[async_trait]
    impl TrackRepository for FailingTrackRepository {
        async fn insert_event(&self, _event: &NewTrackEvent) -> Result<(), AppError> {
            Err(AppError::DatabaseError("connection refused".to_string()))
        }
    }

    fn track_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/track")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_track_event_is_stored() {
        let repo = Arc::new(InMemoryTrackRepository::new());
        let app = create_router(AppStateBuilder::new().with_track_repository(repo.clone()).build());

        let response = app
            .oneshot(track_request(r#"{"id": "abc", "event": "open", "ts": 1718000000000}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let events = repo.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].token.as_deref(), Some("abc"));
        assert_eq!(events[0].ts.as_deref(), Some("1718000000000"));
    }

    #[tokio::test]
    async fn test_track_event_failure_still_ok() {
        let app = create_router(
            AppStateBuilder::new()
                .with_track_repository(Arc::new(FailingTrackRepository))
                .build(),
        );

        let response = app
            .oneshot(track_request(r#"{"event": "open"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"ok":true}"#);
    }
}
