// Library interface for gos
// The binary is a thin wrapper; integration tests use these modules directly.

pub mod cli;
pub mod cli_utils;
pub mod commands;
pub mod config;
pub mod config_discovery;
pub mod logging;
pub mod merger;
pub mod script;

// Re-export commonly used types
pub use config::GosConfig;
pub use script::{Mode, ScriptError, ScriptMetadata, ScriptRunner};
