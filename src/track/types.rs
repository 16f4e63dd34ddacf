use serde::{Deserialize, Serialize};

use super::models::NewTrackEvent;
use crate::shared::non_blank;

/// Client timestamps arrive either as epoch millis or as a string
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ClientTimestamp {
    Text(String),
    Number(serde_json::Number),
}

impl ClientTimestamp {
    fn into_text(self) -> String {
        match self {
            ClientTimestamp::Text(text) => text,
            ClientTimestamp::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TrackRequest {
    pub id: Option<String>,
    pub token: Option<String>,
    pub event: Option<String>,
    pub url: Option<String>,
    pub ts: Option<ClientTimestamp>,
}

impl From<TrackRequest> for NewTrackEvent {
    fn from(request: TrackRequest) -> Self {
        Self {
            token: non_blank(request.id).or_else(|| non_blank(request.token)),
            event: non_blank(request.event),
            url: non_blank(request.url),
            ts: non_blank(request.ts.map(ClientTimestamp::into_text)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TrackResponse {
    pub ok: bool,
}
