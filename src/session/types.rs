use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{SessionModel, UserModel};

/// Identity attached to request extensions by the session middleware
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub session: SessionModel,
    pub user: UserModel,
}

/// Response for the current-user endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CurrentUserResponse {
    pub user_id: Uuid,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl From<&CurrentSession> for CurrentUserResponse {
    fn from(current: &CurrentSession) -> Self {
        Self {
            user_id: current.user.id,
            username: current.user.username.clone(),
            expires_at: current.session.expires_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LogoutResponse {
    pub ok: bool,
}
