use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{instrument, warn};

use super::models::{NewTrackEvent, TrackEventModel};
use crate::shared::AppError;

/// Trait for client event persistence
#[async_trait]
pub trait TrackRepository {
    async fn insert_event(&self, event: &NewTrackEvent) -> Result<(), AppError>;
}

/// In-memory implementation of TrackRepository for development and testing
#[derive(Default)]
pub struct InMemoryTrackRepository {
    events: RwLock<Vec<TrackEventModel>>,
}

impl InMemoryTrackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<TrackEventModel> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl TrackRepository for InMemoryTrackRepository {
    #[instrument(skip(self, event))]
    async fn insert_event(&self, event: &NewTrackEvent) -> Result<(), AppError> {
        let mut events = self.events.write().await;
        let id = events.len() as i64 + 1;
        events.push(TrackEventModel {
            id,
            token: event.token.clone(),
            event: event.event.clone(),
            url: event.url.clone(),
            ts: event.ts.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }
}

/// PostgreSQL implementation of TrackRepository
pub struct PostgresTrackRepository {
    pool: PgPool,
}

impl PostgresTrackRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackRepository for PostgresTrackRepository {
    #[instrument(skip(self, event))]
    async fn insert_event(&self, event: &NewTrackEvent) -> Result<(), AppError> {
        sqlx::query("INSERT INTO tracks (token, event, url, ts) VALUES ($1, $2, $3, $4)")
            .bind(&event.token)
            .bind(&event.event)
            .bind(&event.url)
            .bind(&event.ts)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to insert track event");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(())
    }
}
