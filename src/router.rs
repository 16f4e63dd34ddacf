use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::{group, health, qr, rsvp, session, shared::AppState, track};

/// Builds the application router. Every route runs behind the session
/// cookie middleware and the HTTP trace layer.
pub fn create_router(app_state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/groups", get(group::list_groups).post(group::create_group))
        .route("/groups/:id", delete(group::delete_group))
        .route("/rsvps", get(rsvp::list_rsvps));

    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/rsvp", post(rsvp::submit_rsvp))
        .route("/checkin", post(rsvp::check_in))
        .route("/qr", post(qr::export_qr_codes))
        .route("/track", post(track::track_event))
        .nest("/admin", admin_routes);

    let auth_routes = Router::new()
        .route("/me", get(session::current_user))
        .route("/logout", post(session::logout));

    Router::new()
        .nest("/api", api_routes)
        .nest("/auth", auth_routes)
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            session::session_auth,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
