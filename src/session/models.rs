use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::token::hash_session_token;

/// Database model for the sessions table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct SessionModel {
    pub id: String, // sha256 hex of the session token
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl SessionModel {
    /// Creates a session for `user_id` keyed by the hash of `token`
    pub fn new(token: &str, user_id: Uuid, lifetime: Duration) -> Self {
        Self {
            id: hash_session_token(token),
            user_id,
            expires_at: Utc::now() + lifetime,
        }
    }

    /// A session is valid only while `now < expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Whether the remaining lifetime has dropped below `threshold`
    pub fn needs_renewal_at(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        self.expires_at - now < threshold
    }

    pub fn extend_expiration(&mut self, now: DateTime<Utc>, lifetime: Duration) {
        self.expires_at = now + lifetime;
    }
}

/// Identity record that owns sessions. Managed outside this service.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct UserModel {
    pub id: Uuid,
    pub username: String,
}

impl UserModel {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
        }
    }
}
