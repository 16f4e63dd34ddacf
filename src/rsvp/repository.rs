use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{CheckInRecord, GeneratedTokenModel, NewGeneratedToken, NewRsvp, RsvpModel};
use crate::shared::AppError;

/// Trait for RSVP and generated token persistence
#[async_trait]
pub trait RsvpRepository {
    async fn create_rsvp(&self, rsvp: &NewRsvp) -> Result<RsvpModel, AppError>;
    /// Inserts every token in one batch. Duplicate tokens fail the whole batch.
    async fn insert_tokens(
        &self,
        tokens: &[NewGeneratedToken],
    ) -> Result<Vec<GeneratedTokenModel>, AppError>;
    /// All RSVPs, newest first
    async fn list_rsvps(&self) -> Result<Vec<RsvpModel>, AppError>;
    async fn count_checked_in(&self, rsvp_id: i64) -> Result<i64, AppError>;
    /// Marks the token checked in, keeping the first check-in time.
    /// Returns None when no token matches.
    async fn check_in(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<CheckInRecord>, AppError>;
}

#[derive(Default)]
struct RsvpTables {
    rsvps: Vec<RsvpModel>,
    tokens: Vec<GeneratedTokenModel>,
    next_rsvp_id: i64,
    next_token_id: i64,
}

/// In-memory implementation of RsvpRepository for development and testing
#[derive(Default)]
pub struct InMemoryRsvpRepository {
    tables: RwLock<RsvpTables>,
}

impl InMemoryRsvpRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tokens issued for one RSVP, in insertion order
    pub async fn tokens_for(&self, rsvp_id: i64) -> Vec<GeneratedTokenModel> {
        let tables = self.tables.read().await;
        tables
            .tokens
            .iter()
            .filter(|t| t.rsvp_id == rsvp_id)
            .cloned()
            .collect()
    }

    pub async fn rsvp_count(&self) -> usize {
        self.tables.read().await.rsvps.len()
    }
}

#[async_trait]
impl RsvpRepository for InMemoryRsvpRepository {
    #[instrument(skip(self, rsvp), fields(guests = rsvp.guests))]
    async fn create_rsvp(&self, rsvp: &NewRsvp) -> Result<RsvpModel, AppError> {
        let mut tables = self.tables.write().await;
        tables.next_rsvp_id += 1;

        let model = RsvpModel {
            id: tables.next_rsvp_id,
            name: rsvp.name.clone(),
            attendance: rsvp.attendance.clone(),
            song_request: rsvp.song_request.clone(),
            message: rsvp.message.clone(),
            token_base: rsvp.token_base.clone(),
            guests: rsvp.guests,
            group_id: rsvp.group_id,
            created_at: Utc::now(),
        };
        tables.rsvps.push(model.clone());

        debug!(rsvp_id = model.id, "RSVP stored in memory");
        Ok(model)
    }

    #[instrument(skip(self, tokens), fields(token_count = tokens.len()))]
    async fn insert_tokens(
        &self,
        tokens: &[NewGeneratedToken],
    ) -> Result<Vec<GeneratedTokenModel>, AppError> {
        let mut tables = self.tables.write().await;

        // Validate the whole batch before touching the table
        for (i, new_token) in tokens.iter().enumerate() {
            let taken = tables.tokens.iter().any(|t| t.token == new_token.token)
                || tokens[..i].iter().any(|t| t.token == new_token.token);
            if taken {
                warn!(token = %new_token.token, "Generated token already exists in memory");
                return Err(AppError::DatabaseError(
                    "duplicate key value violates unique constraint \"generated_tokens_token_key\""
                        .to_string(),
                ));
            }
        }

        let mut inserted = Vec::with_capacity(tokens.len());
        for new_token in tokens {
            tables.next_token_id += 1;
            let model = GeneratedTokenModel {
                id: tables.next_token_id,
                token: new_token.token.clone(),
                rsvp_id: new_token.rsvp_id,
                label: new_token.label.clone(),
                checked_in: false,
                checked_in_at: None,
            };
            tables.tokens.push(model.clone());
            inserted.push(model);
        }

        Ok(inserted)
    }

    #[instrument(skip(self))]
    async fn list_rsvps(&self) -> Result<Vec<RsvpModel>, AppError> {
        let tables = self.tables.read().await;
        let mut rsvps = tables.rsvps.clone();
        rsvps.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rsvps)
    }

    #[instrument(skip(self))]
    async fn count_checked_in(&self, rsvp_id: i64) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        let count = tables
            .tokens
            .iter()
            .filter(|t| t.rsvp_id == rsvp_id && t.checked_in)
            .count();
        Ok(count as i64)
    }

    #[instrument(skip(self))]
    async fn check_in(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<CheckInRecord>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.tokens.iter_mut().find(|t| t.token == token) else {
            return Ok(None);
        };

        let already_checked_in = row.checked_in;
        row.checked_in = true;
        let checked_in_at = *row.checked_in_at.get_or_insert(at);

        Ok(Some(CheckInRecord {
            label: row.label.clone(),
            checked_in_at,
            already_checked_in,
        }))
    }
}

/// PostgreSQL implementation of RsvpRepository
pub struct PostgresRsvpRepository {
    pool: PgPool,
}

impl PostgresRsvpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const RSVP_COLUMNS: &str =
    "id, name, attendance, song_request, message, token_base, guests, group_id, created_at";

#[async_trait]
impl RsvpRepository for PostgresRsvpRepository {
    #[instrument(skip(self, rsvp), fields(guests = rsvp.guests))]
    async fn create_rsvp(&self, rsvp: &NewRsvp) -> Result<RsvpModel, AppError> {
        sqlx::query_as::<_, RsvpModel>(&format!(
            "INSERT INTO rsvps \
             (name, attendance, song_request, message, token_base, guests, group_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {RSVP_COLUMNS}"
        ))
        .bind(&rsvp.name)
        .bind(&rsvp.attendance)
        .bind(&rsvp.song_request)
        .bind(&rsvp.message)
        .bind(&rsvp.token_base)
        .bind(rsvp.guests)
        .bind(rsvp.group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to insert RSVP");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self, tokens), fields(token_count = tokens.len()))]
    async fn insert_tokens(
        &self,
        tokens: &[NewGeneratedToken],
    ) -> Result<Vec<GeneratedTokenModel>, AppError> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO generated_tokens (token, rsvp_id, label) ");
        builder.push_values(tokens, |mut row, token| {
            row.push_bind(token.token.clone())
                .push_bind(token.rsvp_id)
                .push_bind(token.label.clone());
        });
        builder.push(" RETURNING id, token, rsvp_id, label, checked_in, checked_in_at");

        builder
            .build_query_as::<GeneratedTokenModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to insert generated tokens");
                AppError::DatabaseError(e.to_string())
            })
    }

    #[instrument(skip(self))]
    async fn list_rsvps(&self) -> Result<Vec<RsvpModel>, AppError> {
        sqlx::query_as::<_, RsvpModel>(&format!(
            "SELECT {RSVP_COLUMNS} FROM rsvps ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list RSVPs");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn count_checked_in(&self, rsvp_id: i64) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM generated_tokens WHERE rsvp_id = $1 AND checked_in = TRUE",
        )
        .bind(rsvp_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to count check-ins");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn check_in(
        &self,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<CheckInRecord>, AppError> {
        // `previous` sees the row as it was before this statement's update
        sqlx::query_as::<_, CheckInRecord>(
            "WITH previous AS ( \
                 SELECT id, checked_in FROM generated_tokens WHERE token = $1 \
             ) \
             UPDATE generated_tokens t \
             SET checked_in = TRUE, checked_in_at = COALESCE(t.checked_in_at, $2) \
             FROM previous WHERE t.id = previous.id \
             RETURNING t.label, t.checked_in_at, previous.checked_in AS already_checked_in",
        )
        .bind(token)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to check in token");
            AppError::DatabaseError(e.to_string())
        })
    }
}
