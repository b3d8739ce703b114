/// Single-file Go scripts with inline dependency metadata
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod orchestrator;
pub mod toolchain;
pub mod workspace;

pub use error::{Phase, ScriptError};
pub use metadata::{parse_script, ParseOptions, ParsedScript, ScriptMetadata};
pub use orchestrator::{Mode, Plan, RunnerOptions, ScriptRunner};
pub use toolchain::{GoToolchain, Toolchain};
pub use workspace::Workspace;
