use axum::http::{header, HeaderMap};
use chrono::{DateTime, Utc};

pub const SESSION_COOKIE_NAME: &str = "auth-session";

/// Reads a cookie value by name from every `Cookie` header on the request
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Formats the `Set-Cookie` value carrying the session token until `expires_at`
pub fn format_session_cookie(token: &str, expires_at: DateTime<Utc>, secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!(
        "{SESSION_COOKIE_NAME}={token}; HttpOnly{secure_flag}; SameSite=Lax; Path=/; Expires={}",
        expires_at.format("%a, %d %b %Y %H:%M:%S GMT")
    )
}

/// Formats the `Set-Cookie` value that clears the session cookie
pub fn format_delete_session_cookie(secure: bool) -> String {
    let secure_flag = if secure { "; Secure" } else { "" };
    format!("{SESSION_COOKIE_NAME}=; HttpOnly{secure_flag}; SameSite=Lax; Path=/; Max-Age=0")
}

/// Whether a `Set-Cookie` value targets the session cookie
pub fn is_session_cookie(set_cookie: &str) -> bool {
    set_cookie
        .split_once('=')
        .is_some_and(|(name, _)| name.trim() == SESSION_COOKIE_NAME)
}
