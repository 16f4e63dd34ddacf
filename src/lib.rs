// Library crate for the wedding RSVP server
// This file exposes the public API for the binary and integration tests

pub mod config;
pub mod group;
pub mod health;
pub mod qr;
pub mod router;
pub mod rsvp;
pub mod session;
pub mod shared;
pub mod track;

// Re-export commonly used types for easier access in tests
pub use config::{AppConfig, Environment};
pub use router::create_router;
pub use shared::{AppError, AppState};
