use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the rsvps table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct RsvpModel {
    pub id: i64,
    pub name: Option<String>,
    pub attendance: Option<String>,
    pub song_request: Option<String>,
    pub message: Option<String>,
    pub token_base: Option<String>, // Client-supplied prefix for the check-in tokens
    pub guests: i32,
    pub group_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRsvp {
    pub name: Option<String>,
    pub attendance: Option<String>,
    pub song_request: Option<String>,
    pub message: Option<String>,
    pub token_base: Option<String>,
    pub guests: i32,
    pub group_id: Option<i64>,
}

/// Database model for the generated_tokens table: one row per guest seat
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct GeneratedTokenModel {
    pub id: i64,
    pub token: String,
    pub rsvp_id: i64,
    pub label: String,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewGeneratedToken {
    pub token: String,
    pub rsvp_id: i64,
    pub label: String,
}

/// Result of marking a token as checked in
#[derive(Debug, Clone, FromRow, PartialEq)]
pub struct CheckInRecord {
    pub label: String,
    pub checked_in_at: DateTime<Utc>,
    /// The token had already been checked in before this call
    pub already_checked_in: bool,
}
