use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{InvitationGroupModel, NewInvitationGroup};
use crate::shared::AppError;

/// Trait for invitation group persistence
#[async_trait]
pub trait GroupRepository {
    /// All groups, newest first
    async fn list_groups(&self) -> Result<Vec<InvitationGroupModel>, AppError>;
    async fn find_by_token(&self, token: &str) -> Result<Option<InvitationGroupModel>, AppError>;
    /// Inserts a group. Duplicate tokens are rejected.
    async fn create_group(
        &self,
        group: &NewInvitationGroup,
    ) -> Result<InvitationGroupModel, AppError>;
    /// Returns whether a row was removed
    async fn delete_group(&self, group_id: i64) -> Result<bool, AppError>;
}

#[derive(Default)]
struct GroupTable {
    groups: Vec<InvitationGroupModel>,
    next_id: i64,
}

/// In-memory implementation of GroupRepository for development and testing
#[derive(Default)]
pub struct InMemoryGroupRepository {
    table: RwLock<GroupTable>,
}

impl InMemoryGroupRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    #[instrument(skip(self))]
    async fn list_groups(&self) -> Result<Vec<InvitationGroupModel>, AppError> {
        let table = self.table.read().await;
        let mut groups = table.groups.clone();
        groups.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(groups)
    }

    #[instrument(skip(self))]
    async fn find_by_token(&self, token: &str) -> Result<Option<InvitationGroupModel>, AppError> {
        let table = self.table.read().await;
        Ok(table.groups.iter().find(|g| g.token == token).cloned())
    }

    #[instrument(skip(self, group), fields(token = %group.token))]
    async fn create_group(
        &self,
        group: &NewInvitationGroup,
    ) -> Result<InvitationGroupModel, AppError> {
        let mut table = self.table.write().await;
        if table.groups.iter().any(|g| g.token == group.token) {
            warn!("Group token already exists in memory");
            return Err(AppError::DatabaseError(
                "duplicate key value violates unique constraint \"invitation_groups_token_key\""
                    .to_string(),
            ));
        }

        table.next_id += 1;
        let model = InvitationGroupModel {
            id: table.next_id,
            token: group.token.clone(),
            group_name: group.group_name.clone(),
            group_type: group.group_type.clone(),
            suggested_guests: group.suggested_guests,
            contact_person: group.contact_person.clone(),
            notes: group.notes.clone(),
            created_at: Utc::now(),
        };
        table.groups.push(model.clone());

        debug!(group_id = model.id, "Group created in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn delete_group(&self, group_id: i64) -> Result<bool, AppError> {
        let mut table = self.table.write().await;
        let initial_count = table.groups.len();
        table.groups.retain(|g| g.id != group_id);
        Ok(table.groups.len() < initial_count)
    }
}

/// PostgreSQL implementation of GroupRepository
pub struct PostgresGroupRepository {
    pool: PgPool,
}

impl PostgresGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const GROUP_COLUMNS: &str =
    "id, token, group_name, group_type, suggested_guests, contact_person, notes, created_at";

#[async_trait]
impl GroupRepository for PostgresGroupRepository {
    #[instrument(skip(self))]
    async fn list_groups(&self) -> Result<Vec<InvitationGroupModel>, AppError> {
        sqlx::query_as::<_, InvitationGroupModel>(&format!(
            "SELECT {GROUP_COLUMNS} FROM invitation_groups ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list groups");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn find_by_token(&self, token: &str) -> Result<Option<InvitationGroupModel>, AppError> {
        sqlx::query_as::<_, InvitationGroupModel>(&format!(
            "SELECT {GROUP_COLUMNS} FROM invitation_groups WHERE token = $1 LIMIT 1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch group by token");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self, group), fields(token = %group.token))]
    async fn create_group(
        &self,
        group: &NewInvitationGroup,
    ) -> Result<InvitationGroupModel, AppError> {
        sqlx::query_as::<_, InvitationGroupModel>(&format!(
            "INSERT INTO invitation_groups \
             (token, group_name, group_type, suggested_guests, contact_person, notes) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {GROUP_COLUMNS}"
        ))
        .bind(&group.token)
        .bind(&group.group_name)
        .bind(&group.group_type)
        .bind(group.suggested_guests)
        .bind(&group.contact_person)
        .bind(&group.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create group");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn delete_group(&self, group_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM invitation_groups WHERE id = $1")
            .bind(group_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to delete group");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
