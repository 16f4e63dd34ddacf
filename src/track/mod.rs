pub use handlers::track_event;

mod handlers;
pub mod models;
pub mod repository;
pub mod types;
