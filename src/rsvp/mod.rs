// Public API - what other modules can use
pub use handlers::{check_in, list_rsvps, submit_rsvp};

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
