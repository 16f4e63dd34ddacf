use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::shared::AppState;

const PREVIEW_CHARS: usize = 40;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub has_database_url: bool,
    pub database_url_preview: String,
    pub has_base_origin: bool,
    pub environment: String,
    pub timestamp: DateTime<Utc>,
}

/// Truncated connection string, never the full credential
fn database_url_preview(database_url: Option<&str>) -> String {
    match database_url {
        Some(url) => format!("{}...", url.chars().take(PREVIEW_CHARS).collect::<String>()),
        None => "MISSING".to_string(),
    }
}

/// GET /api/health
#[instrument(name = "health_check", skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = &state.config;

    Json(HealthResponse {
        has_database_url: config.database_url.is_some(),
        database_url_preview: database_url_preview(config.database_url.as_deref()),
        has_base_origin: config.base_origin_configured,
        environment: config.environment.to_string(),
        timestamp: Utc::now(),
    })
}
