use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{debug, info, instrument};

use super::{
    cookie::{
        format_delete_session_cookie, format_session_cookie, is_session_cookie, read_cookie,
        SESSION_COOKIE_NAME,
    },
    types::CurrentSession,
};
use crate::shared::{AppError, AppState};

/// Cookie session middleware - resolves the `auth-session` cookie to a session
/// and user and adds `CurrentSession` to the request.
/// Usage: .layer(middleware::from_fn_with_state(app_state.clone(), session::session_auth))
/// Handlers can then extract Option<Extension<CurrentSession>>.
///
/// When a cookie was presented the response carries exactly one session
/// cookie mutation: a refreshed cookie for a live session, a deletion
/// otherwise. A handler that already set the session cookie (logout) wins.
#[instrument(skip_all, fields(uri = %req.uri()))]
pub async fn session_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = read_cookie(req.headers(), SESSION_COOKIE_NAME) else {
        debug!("No session cookie on request");
        return Ok(next.run(req).await);
    };

    let secure = state.config.cookie_secure;
    let validation = state.session_service.validate_session_token(&token).await?;

    let cookie = match (validation.session, validation.user) {
        (Some(session), Some(user)) => {
            info!(username = %user.username, "Session authenticated");
            let cookie = format_session_cookie(&token, session.expires_at, secure);
            req.extensions_mut().insert(CurrentSession { session, user });
            cookie
        }
        _ => {
            info!("Session cookie rejected, clearing it");
            format_delete_session_cookie(secure)
        }
    };

    let mut response = next.run(req).await;

    let already_set = response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(is_session_cookie);

    if !already_set {
        let value = HeaderValue::from_str(&cookie).map_err(|_| AppError::Internal)?;
        response.headers_mut().append(header::SET_COOKIE, value);
    }

    Ok(response)
}
