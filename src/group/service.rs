use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    models::{generate_group_token, InvitationGroupModel, NewInvitationGroup},
    repository::GroupRepository,
    types::CreateGroupRequest,
};
use crate::shared::{non_blank, optional_integer, AppError};

const DEFAULT_GROUP_TYPE: &str = "family";
const DEFAULT_SUGGESTED_GUESTS: i32 = 1;

/// Service for admin group management
pub struct GroupService {
    repository: Arc<dyn GroupRepository + Send + Sync>,
}

impl GroupService {
    pub fn new(repository: Arc<dyn GroupRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    /// Lists every group, or only the group matching `token` (as a 0/1 element list)
    #[instrument(skip(self))]
    pub async fn list_groups(
        &self,
        token: Option<String>,
    ) -> Result<Vec<InvitationGroupModel>, AppError> {
        match non_blank(token) {
            Some(token) => {
                debug!(token = %token, "Listing groups filtered by token");
                Ok(self
                    .repository
                    .find_by_token(&token)
                    .await?
                    .into_iter()
                    .collect())
            }
            None => self.repository.list_groups().await,
        }
    }

    /// Creates a group with a server-generated token. Token collisions are
    /// not retried; the store's uniqueness constraint rejects them.
    #[instrument(skip(self, request))]
    pub async fn create_group(
        &self,
        request: CreateGroupRequest,
    ) -> Result<InvitationGroupModel, AppError> {
        let group_name = non_blank(request.group_name)
            .ok_or_else(|| AppError::InvalidInput("Group name is required".to_string()))?;

        let suggested_guests = optional_integer(request.suggested_guests, invalid_suggested_guests)?
            .unwrap_or(DEFAULT_SUGGESTED_GUESTS);
        if suggested_guests < 1 {
            return Err(invalid_suggested_guests());
        }

        let new_group = NewInvitationGroup {
            token: generate_group_token(),
            group_name,
            group_type: non_blank(request.group_type)
                .unwrap_or_else(|| DEFAULT_GROUP_TYPE.to_string()),
            suggested_guests,
            contact_person: non_blank(request.contact_person),
            notes: non_blank(request.notes),
        };

        let group = self.repository.create_group(&new_group).await?;

        info!(
            group_id = group.id,
            token = %group.token,
            suggested_guests = group.suggested_guests,
            "Group created"
        );
        Ok(group)
    }

    #[instrument(skip(self))]
    pub async fn delete_group(&self, group_id: i64) -> Result<(), AppError> {
        let removed = self.repository.delete_group(group_id).await?;
        info!(group_id, removed, "Group delete processed");
        Ok(())
    }
}

fn invalid_suggested_guests() -> AppError {
    AppError::InvalidInput("Suggested guests must be at least 1".to_string())
}
