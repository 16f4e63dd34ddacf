use rand::{distr::Alphanumeric, Rng};
use sha2::{Digest, Sha256};

const SESSION_TOKEN_LENGTH: usize = 32;

/// Generates a random opaque session token suitable for a cookie value
pub fn generate_session_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Derives the session id from a token. Only the hash is ever persisted.
pub fn hash_session_token(token: &str) -> String {
    let hash = Sha256::digest(token.as_bytes());
    format!("{hash:x}")
}
