// Public API - what other modules can use
pub use handlers::{current_user, logout};
pub use middleware::session_auth;
pub use token::{generate_session_token, hash_session_token};
pub use types::CurrentSession;

// Internal modules
pub mod cleanup_task;
pub mod cookie;
mod handlers;
mod middleware;
pub mod models;
pub mod repository;
pub mod service;
mod token;
pub mod types;
