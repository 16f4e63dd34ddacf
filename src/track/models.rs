use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the tracks table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct TrackEventModel {
    pub id: i64,
    pub token: Option<String>,
    pub event: Option<String>,
    pub url: Option<String>,
    pub ts: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTrackEvent {
    pub token: Option<String>,
    pub event: Option<String>,
    pub url: Option<String>,
    pub ts: Option<String>,
}
