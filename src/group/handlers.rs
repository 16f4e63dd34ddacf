use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::InvitationGroupModel,
    service::GroupService,
    types::{CreateGroupRequest, DeleteGroupResponse, GroupListQuery},
};
use crate::shared::{AppError, AppState, JsonBody};

/// HTTP handler for listing invitation groups
///
/// GET /api/admin/groups[?token=XXXXXXXX]
/// Returns all groups newest first, or the single group matching the token
#[instrument(name = "list_groups", skip(state))]
pub async fn list_groups(
    State(state): State<AppState>,
    Query(query): Query<GroupListQuery>,
) -> Result<Json<Vec<InvitationGroupModel>>, AppError> {
    let service = GroupService::new(Arc::clone(&state.group_repository));
    let groups = service.list_groups(query.token).await?;

    info!(group_count = groups.len(), "Groups listed");
    Ok(Json(groups))
}

/// HTTP handler for creating an invitation group
///
/// POST /api/admin/groups
#[instrument(name = "create_group", skip(state, request))]
pub async fn create_group(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateGroupRequest>,
) -> Result<Json<InvitationGroupModel>, AppError> {
    let service = GroupService::new(Arc::clone(&state.group_repository));
    let group = service.create_group(request).await?;

    Ok(Json(group))
}

/// HTTP handler for deleting an invitation group
///
/// DELETE /api/admin/groups/:id
#[instrument(name = "delete_group", skip(state))]
pub async fn delete_group(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteGroupResponse>, AppError> {
    let group_id: i64 = raw_id
        .parse()
        .map_err(|_| AppError::InvalidInput("Invalid group ID".to_string()))?;

    let service = GroupService::new(Arc::clone(&state.group_repository));
    service.delete_group(group_id).await?;

    Ok(Json(DeleteGroupResponse { success: true }))
}
