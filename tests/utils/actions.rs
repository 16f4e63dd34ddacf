use axum::{
    body::Body,
    http::{header, Request, Response},
};
use serde_json::Value;
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Sends a request through the full router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    /// GET with the session cookie attached
    pub async fn get_with_session(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, format!("auth-session={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_with_session(&self, uri: &str, token: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::COOKIE, format!("auth-session={token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn submit_rsvp(&self, body: Value) -> Response<Body> {
        self.post_json("/api/rsvp", body).await
    }

    pub async fn check_in(&self, token: &str) -> Response<Body> {
        self.post_json("/api/checkin", serde_json::json!({ "token": token }))
            .await
    }
}
