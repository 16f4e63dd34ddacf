use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, warn};

use crate::config::AppConfig;
use crate::group::repository::GroupRepository;
use crate::rsvp::repository::RsvpRepository;
use crate::session::{repository::SessionRepository, service::SessionService};
use crate::track::repository::TrackRepository;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub session_service: Arc<SessionService>,
    pub group_repository: Arc<dyn GroupRepository + Send + Sync>,
    pub rsvp_repository: Arc<dyn RsvpRepository + Send + Sync>,
    pub track_repository: Arc<dyn TrackRepository + Send + Sync>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        session_repository: Arc<dyn SessionRepository + Send + Sync>,
        group_repository: Arc<dyn GroupRepository + Send + Sync>,
        rsvp_repository: Arc<dyn RsvpRepository + Send + Sync>,
        track_repository: Arc<dyn TrackRepository + Send + Sync>,
    ) -> Self {
        let session_service = Arc::new(SessionService::new(
            session_repository,
            config.session.clone(),
        ));

        Self {
            config: Arc::new(config),
            session_service,
            group_repository,
            rsvp_repository,
            track_repository,
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::QuotaExceeded(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::MissingConfiguration(_)
            | AppError::DatabaseError(_)
            | AppError::ArchiveError(_)
            | AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            AppError::InvalidInput(msg)
            | AppError::QuotaExceeded(msg)
            | AppError::NotFound(msg)
            | AppError::Unauthorized(msg) => msg.clone(),
            other => other.to_string(),
        };

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = Json(json!({
            "ok": false,
            "error": error_message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

/// `Json` request body whose rejections use the `{ok:false,error}` shape
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

/// Integer field that clients send either as a JSON number or as a numeric string
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum IntegerInput {
    Number(i64),
    Text(String),
}

impl IntegerInput {
    /// Blank text counts as absent. Non-numeric text and values outside
    /// `i32` map to `invalid()`.
    pub fn resolve(self, invalid: impl FnOnce() -> AppError) -> Result<Option<i32>, AppError> {
        match self {
            IntegerInput::Number(number) => i32::try_from(number).map(Some).map_err(|_| invalid()),
            IntegerInput::Text(text) => match text.trim() {
                "" => Ok(None),
                digits => digits.parse().map(Some).map_err(|_| invalid()),
            },
        }
    }
}

/// Resolves an optional [`IntegerInput`], with `null` and blank text both absent
pub fn optional_integer(
    value: Option<IntegerInput>,
    invalid: impl FnOnce() -> AppError,
) -> Result<Option<i32>, AppError> {
    match value {
        Some(input) => input.resolve(invalid),
        None => Ok(None),
    }
}

/// Trims optional text input, treating blank strings as absent
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use crate::group::repository::InMemoryGroupRepository;
    use crate::rsvp::repository::InMemoryRsvpRepository;
    use crate::session::repository::InMemorySessionRepository;
    use crate::track::repository::InMemoryTrackRepository;

    /// Builder for creating AppState with overrides for testing.
    /// Anything not overridden is backed by an empty in-memory repository.
    pub struct AppStateBuilder {
        config: AppConfig,
        session_repository: Option<Arc<dyn SessionRepository + Send + Sync>>,
        group_repository: Option<Arc<dyn GroupRepository + Send + Sync>>,
        rsvp_repository: Option<Arc<dyn RsvpRepository + Send + Sync>>,
        track_repository: Option<Arc<dyn TrackRepository + Send + Sync>>,
    }

    impl AppStateBuilder {
        pub fn new() -> Self {
            Self {
                config: AppConfig::default(),
                session_repository: None,
                group_repository: None,
                rsvp_repository: None,
                track_repository: None,
            }
        }

        pub fn with_config(mut self, config: AppConfig) -> Self {
            self.config = config;
            self
        }

        pub fn with_session_repository(
            mut self,
            repo: Arc<dyn SessionRepository + Send + Sync>,
        ) -> Self {
            self.session_repository = Some(repo);
            self
        }

        pub fn with_group_repository(
            mut self,
            repo: Arc<dyn GroupRepository + Send + Sync>,
        ) -> Self {
            self.group_repository = Some(repo);
            self
        }

        pub fn with_rsvp_repository(mut self, repo: Arc<dyn RsvpRepository + Send + Sync>) -> Self {
            self.rsvp_repository = Some(repo);
            self
        }

        pub fn with_track_repository(
            mut self,
            repo: Arc<dyn TrackRepository + Send + Sync>,
        ) -> Self {
            self.track_repository = Some(repo);
            self
        }

        pub fn build(self) -> AppState {
            AppState::new(
                self.config,
                self.session_repository
                    .unwrap_or_else(|| Arc::new(InMemorySessionRepository::new())),
                self.group_repository
                    .unwrap_or_else(|| Arc::new(InMemoryGroupRepository::new())),
                self.rsvp_repository
                    .unwrap_or_else(|| Arc::new(InMemoryRsvpRepository::new())),
                self.track_repository
                    .unwrap_or_else(|| Arc::new(InMemoryTrackRepository::new())),
            )
        }
    }

    impl Default for AppStateBuilder {
        fn default() -> Self {
            Self::new()
        }
    }
}
