pub mod actions;
pub mod assertions;
pub mod setup;

// Re-export main utilities for use by test files
#[allow(unused_imports)]
pub use assertions::{body_bytes, expect_error, expect_json, expect_zip_entries, set_cookies};
#[allow(unused_imports)]
pub use setup::{TestSetup, TestSetupBuilder};
