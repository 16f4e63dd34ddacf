use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::{SessionModel, UserModel};
use crate::shared::AppError;

/// Trait for session store operations
#[async_trait]
pub trait SessionRepository {
    async fn create_session(&self, session: &SessionModel) -> Result<(), AppError>;
    /// Fetches a session joined with its owning user
    async fn get_session_and_user(
        &self,
        session_id: &str,
    ) -> Result<Option<(SessionModel, UserModel)>, AppError>;
    async fn update_session_expiry(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;
    /// Returns whether a row was removed
    async fn delete_session(&self, session_id: &str) -> Result<bool, AppError>;
    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<u64, AppError>;
    async fn cleanup_expired_sessions(&self) -> Result<u64, AppError>;
}

/// In-memory implementation of SessionRepository for development and testing.
/// Users are seeded up front since this service never creates them.
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, SessionModel>>,
    users: RwLock<HashMap<Uuid, UserModel>>,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
        }
    }

    pub fn with_users(users: Vec<UserModel>) -> Self {
        let users = users.into_iter().map(|user| (user.id, user)).collect();
        Self {
            sessions: RwLock::new(HashMap::new()),
            users: RwLock::new(users),
        }
    }

    pub async fn add_user(&self, user: UserModel) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn get_session(&self, session_id: &str) -> Option<SessionModel> {
        self.sessions.read().await.get(session_id).cloned()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session(&self, session: &SessionModel) -> Result<(), AppError> {
        debug!(user_id = %session.user_id, "Creating session in memory");

        if !self.users.read().await.contains_key(&session.user_id) {
            warn!(user_id = %session.user_id, "Session owner does not exist");
            return Err(AppError::DatabaseError(
                "Session owner does not exist".to_string(),
            ));
        }

        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            warn!("Session already exists in memory");
            return Err(AppError::DatabaseError(
                "Session already exists".to_string(),
            ));
        }
        sessions.insert(session.id.clone(), session.clone());

        Ok(())
    }

    #[instrument(skip(self, session_id))]
    async fn get_session_and_user(
        &self,
        session_id: &str,
    ) -> Result<Option<(SessionModel, UserModel)>, AppError> {
        let Some(session) = self.sessions.read().await.get(session_id).cloned() else {
            debug!("Session not found in memory");
            return Ok(None);
        };

        let user = self.users.read().await.get(&session.user_id).cloned();
        Ok(user.map(|user| (session, user)))
    }

    #[instrument(skip(self, session_id))]
    async fn update_session_expiry(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) => {
                session.expires_at = expires_at;
                Ok(())
            }
            None => {
                warn!("Session not found for update in memory");
                Err(AppError::NotFound("Session not found".to_string()))
            }
        }
    }

    #[instrument(skip(self, session_id))]
    async fn delete_session(&self, session_id: &str) -> Result<bool, AppError> {
        let removed = self.sessions.write().await.remove(session_id).is_some();
        debug!(removed, "Deleted session from memory");
        Ok(removed)
    }

    #[instrument(skip(self))]
    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<u64, AppError> {
        let mut sessions = self.sessions.write().await;
        let initial_count = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        Ok((initial_count - sessions.len()) as u64)
    }

    #[instrument(skip(self))]
    async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        let initial_count = sessions.len();

        sessions.retain(|_, session| !session.is_expired_at(now));

        let removed_count = initial_count - sessions.len();
        debug!(
            expired_sessions_removed = removed_count,
            "Expired sessions cleaned up from memory"
        );
        Ok(removed_count as u64)
    }
}

/// PostgreSQL implementation of the session store
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    #[instrument(skip(self, session))]
    async fn create_session(&self, session: &SessionModel) -> Result<(), AppError> {
        debug!(user_id = %session.user_id, "Creating session in database");

        sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(&session.id)
            .bind(session.user_id)
            .bind(session.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create session in database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }

    #[instrument(skip(self, session_id))]
    async fn get_session_and_user(
        &self,
        session_id: &str,
    ) -> Result<Option<(SessionModel, UserModel)>, AppError> {
        let row = sqlx::query(
            "SELECT s.id, s.user_id, s.expires_at, u.username \
             FROM sessions s INNER JOIN users u ON u.id = s.user_id \
             WHERE s.id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch session from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let Some(row) = row else {
            debug!("Session not found in database");
            return Ok(None);
        };

        let session = SessionModel::from_row(&row)
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        let username: String = row
            .try_get("username")
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        let user = UserModel {
            id: session.user_id,
            username,
        };

        Ok(Some((session, user)))
    }

    #[instrument(skip(self, session_id))]
    async fn update_session_expiry(
        &self,
        session_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE sessions SET expires_at = $2 WHERE id = $1")
            .bind(session_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to update session in database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!("Session not found for update");
            return Err(AppError::NotFound("Session not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self, session_id))]
    async fn delete_session(&self, session_id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete session from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self))]
    async fn delete_user_sessions(&self, user_id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete user sessions from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn cleanup_expired_sessions(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to cleanup expired sessions");
                AppError::DatabaseError(e.to_string())
            })?;

        let rows_affected = result.rows_affected();
        debug!(
            expired_sessions_removed = rows_affected,
            "Expired sessions cleaned up"
        );
        Ok(rows_affected)
    }
}
