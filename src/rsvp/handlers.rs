use axum::{extract::State, response::Response, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::RsvpService,
    types::{CheckInRequest, CheckInResponse, RsvpWithCheckIns, SubmitRsvpRequest},
};
use crate::qr::zip_attachment;
use crate::shared::{non_blank, AppError, AppState, JsonBody};

fn rsvp_service(state: &AppState) -> RsvpService {
    RsvpService::new(
        Arc::clone(&state.rsvp_repository),
        Arc::clone(&state.group_repository),
        state.config.base_origin.clone(),
    )
}

/// HTTP handler for RSVP submission
///
/// POST /api/rsvp
/// Responds with a ZIP holding one check-in QR code per guest
#[instrument(name = "submit_rsvp", skip_all)]
pub async fn submit_rsvp(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<SubmitRsvpRequest>,
) -> Result<Response, AppError> {
    let submitted = rsvp_service(&state).submit(request).await?;

    info!(
        rsvp_id = submitted.rsvp.id,
        token_count = submitted.tokens.len(),
        archive_bytes = submitted.archive.len(),
        "Sending RSVP QR archive"
    );
    zip_attachment(&submitted.file_name, submitted.archive)
}

/// HTTP handler for guest check-in
///
/// POST /api/checkin
#[instrument(name = "check_in", skip_all)]
pub async fn check_in(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CheckInRequest>,
) -> Result<Json<CheckInResponse>, AppError> {
    let token = non_blank(request.token)
        .ok_or_else(|| AppError::InvalidInput("Token is required".to_string()))?;

    let response = rsvp_service(&state).check_in(&token).await?;
    Ok(Json(response))
}

/// HTTP handler for the admin RSVP listing
///
/// GET /api/admin/rsvps
#[instrument(name = "list_rsvps", skip(state))]
pub async fn list_rsvps(
    State(state): State<AppState>,
) -> Result<Json<Vec<RsvpWithCheckIns>>, AppError> {
    let rsvps = rsvp_service(&state).list_with_check_ins().await?;

    info!(rsvp_count = rsvps.len(), "RSVPs listed");
    Ok(Json(rsvps))
}
