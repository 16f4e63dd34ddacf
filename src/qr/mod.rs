// Public API - what other modules can use
pub use handlers::{export_qr_codes, zip_attachment};

// Internal modules
pub mod archive;
mod handlers;
pub mod types;
