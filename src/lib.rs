// Re-export main modules for use by the binary and integration tests
pub mod command;
pub mod constants;
pub mod error;
pub mod git;
pub mod github;
pub mod pr;
pub mod report;
pub mod squash;
pub mod types;
