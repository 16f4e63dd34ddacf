use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::{
    models::{SessionModel, UserModel},
    repository::SessionRepository,
    token::hash_session_token,
};
use crate::shared::AppError;

/// Lifetime settings for sessions
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a new or renewed session stays valid
    pub lifetime: Duration,
    /// Sessions with less remaining lifetime than this get extended on use
    pub renewal_threshold: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime: Duration::days(30),
            renewal_threshold: Duration::days(15),
        }
    }
}

/// Outcome of validating a session token. Both fields are `None` when the
/// token does not map to a live session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionValidation {
    pub session: Option<SessionModel>,
    pub user: Option<UserModel>,
}

impl SessionValidation {
    fn invalid() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.session.is_some() && self.user.is_some()
    }
}

/// Session lifecycle: creation, validation, rotation and invalidation
pub struct SessionService {
    repository: Arc<dyn SessionRepository + Send + Sync>,
    config: SessionConfig,
}

impl SessionService {
    pub fn new(repository: Arc<dyn SessionRepository + Send + Sync>, config: SessionConfig) -> Self {
        Self { repository, config }
    }

    /// Persists a new session for `user_id` keyed by the hash of `token`
    #[instrument(skip(self, token))]
    pub async fn create_session(&self, token: &str, user_id: Uuid) -> Result<SessionModel, AppError> {
        let session = SessionModel::new(token, user_id, self.config.lifetime);
        self.repository.create_session(&session).await?;

        info!(user_id = %user_id, expires_at = %session.expires_at, "Session created");
        Ok(session)
    }

    /// Validates a raw session token.
    ///
    /// Unknown tokens fail softly. Expired sessions are deleted and fail
    /// softly. Live sessions are rotated when close to expiry.
    #[instrument(skip(self, token))]
    pub async fn validate_session_token(&self, token: &str) -> Result<SessionValidation, AppError> {
        let session_id = hash_session_token(token);

        let Some((session, user)) = self.repository.get_session_and_user(&session_id).await?
        else {
            debug!("Session token does not match any session");
            return Ok(SessionValidation::invalid());
        };

        if session.is_expired() {
            warn!(user_id = %session.user_id, "Session has expired, deleting");
            self.repository.delete_session(&session.id).await?;
            return Ok(SessionValidation::invalid());
        }

        let session = match self.rotate(session).await {
            Ok(session) => session,
            // Row removed between lookup and renewal (logout or cleanup)
            Err(AppError::NotFound(_)) => {
                warn!(user_id = %user.id, "Session disappeared during renewal");
                return Ok(SessionValidation::invalid());
            }
            Err(e) => return Err(e),
        };

        Ok(SessionValidation {
            session: Some(session),
            user: Some(user),
        })
    }

    /// Extends the session when its remaining lifetime is below the renewal
    /// threshold, otherwise returns it unchanged
    #[instrument(skip(self, session), fields(user_id = %session.user_id))]
    pub async fn rotate(&self, mut session: SessionModel) -> Result<SessionModel, AppError> {
        let now = Utc::now();
        if !session.needs_renewal_at(now, self.config.renewal_threshold) {
            return Ok(session);
        }

        session.extend_expiration(now, self.config.lifetime);
        self.repository
            .update_session_expiry(&session.id, session.expires_at)
            .await?;

        info!(expires_at = %session.expires_at, "Session renewed");
        Ok(session)
    }

    #[instrument(skip(self, session_id))]
    pub async fn invalidate_session(&self, session_id: &str) -> Result<(), AppError> {
        let removed = self.repository.delete_session(session_id).await?;
        info!(removed, "Session invalidated");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn invalidate_user_sessions(&self, user_id: Uuid) -> Result<u64, AppError> {
        let removed = self.repository.delete_user_sessions(user_id).await?;
        info!(user_id = %user_id, removed, "User sessions invalidated");
        Ok(removed)
    }

    #[instrument(skip(self))]
    pub async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let removed_count = self.repository.cleanup_expired_sessions().await?;
        info!(
            removed_sessions = removed_count,
            "Expired sessions cleanup completed"
        );
        Ok(removed_count)
    }
}
