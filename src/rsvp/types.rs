use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::RsvpModel;
use crate::shared::IntegerInput;

/// Request payload for submitting an RSVP
#[derive(Debug, Default, Deserialize)]
pub struct SubmitRsvpRequest {
    /// Base for the generated check-in tokens
    pub id: Option<String>,
    pub name: Option<String>,
    pub attendance: Option<String>,
    pub song_request: Option<String>,
    pub message: Option<String>,
    pub guests: Option<IntegerInput>,
    pub group_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckInRequest {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckInResponse {
    pub ok: bool,
    pub message: String,
    pub label: String,
    pub already_checked_in: bool,
    pub checked_in_at: DateTime<Utc>,
}

/// Admin listing row: the RSVP plus how many of its tokens have checked in
#[derive(Debug, Serialize)]
pub struct RsvpWithCheckIns {
    #[serde(flatten)]
    pub rsvp: RsvpModel,
    pub checked_in_count: i64,
}
