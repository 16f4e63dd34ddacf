use axum::{
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse},
    Extension, Json,
};
use tracing::{info, instrument};

use super::{
    cookie::format_delete_session_cookie,
    types::{CurrentSession, CurrentUserResponse, LogoutResponse},
};
use crate::shared::{AppError, AppState};

/// HTTP handler returning the authenticated user
///
/// GET /auth/me
#[instrument(name = "current_user", skip_all)]
pub async fn current_user(
    current: Option<Extension<CurrentSession>>,
) -> Result<Json<CurrentUserResponse>, AppError> {
    let Extension(current) =
        current.ok_or_else(|| AppError::Unauthorized("Not signed in".to_string()))?;

    Ok(Json(CurrentUserResponse::from(&current)))
}

/// HTTP handler that invalidates the current session and clears its cookie
///
/// POST /auth/logout
#[instrument(name = "logout", skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    current: Option<Extension<CurrentSession>>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(Extension(current)) = current {
        state
            .session_service
            .invalidate_session(&current.session.id)
            .await?;
        info!(username = %current.user.username, "User logged out");
    }

    Ok((
        AppendHeaders([(
            header::SET_COOKIE,
            format_delete_session_cookie(state.config.cookie_secure),
        )]),
        Json(LogoutResponse { ok: true }),
    ))
}
