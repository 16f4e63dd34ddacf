use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

const GROUP_TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
pub const GROUP_TOKEN_LENGTH: usize = 8;

/// Database model for the invitation_groups table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct InvitationGroupModel {
    pub id: i64,
    pub token: String, // Short code shared with the invitees
    pub group_name: String,
    pub group_type: String,
    pub suggested_guests: i32, // Guest quota for RSVPs submitted with this token
    pub contact_person: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for a group; id and created_at are assigned by the store
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvitationGroup {
    pub token: String,
    pub group_name: String,
    pub group_type: String,
    pub suggested_guests: i32,
    pub contact_person: Option<String>,
    pub notes: Option<String>,
}

/// Generates a short readable group token. Uniqueness is left to the store.
pub fn generate_group_token() -> String {
    let mut rng = rand::rng();
    (0..GROUP_TOKEN_LENGTH)
        .map(|_| GROUP_TOKEN_CHARSET[rng.random_range(0..GROUP_TOKEN_CHARSET.len())] as char)
        .collect()
}
