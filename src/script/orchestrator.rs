/// Drives one `run` or `test` invocation end to end
///
/// parse -> workspace -> go.mod -> script copy -> go mod tidy -> build+run | test
///
/// The workspace lives for exactly one invocation and is dropped on every
/// return path.
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::error::ScriptError;
use super::manifest::{self, DEFAULT_GO_VERSION, FALLBACK_SEED};
use super::metadata::{parse_script, ParseOptions, ScriptMetadata};
use super::toolchain::Toolchain;
use super::workspace::Workspace;
use crate::cli_utils;

const SOURCE_EXT: &str = ".go";
const TEST_SUFFIX: &str = "_test.go";

/// What to do with the script once the workspace is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Run,
    Test,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Run => "run",
            Mode::Test => "test",
        }
    }
}

/// Settings for the orchestrator, already merged from CLI, env and file
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    pub go_version: String,
    pub workspace_dir: Option<PathBuf>,
    pub keep_workspace: bool,
    pub parse: ParseOptions,
    pub verbose: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            go_version: DEFAULT_GO_VERSION.to_string(),
            workspace_dir: None,
            keep_workspace: false,
            parse: ParseOptions::default(),
            verbose: false,
        }
    }
}

/// Everything derived from the script before touching the filesystem
#[derive(Debug, Clone)]
pub struct Plan {
    pub metadata: ScriptMetadata,
    pub body: String,
    pub manifest: String,
    /// Script file name inside the workspace
    pub file_name: String,
    /// Executable produced by the build step (run mode)
    pub binary_name: String,
}

pub struct ScriptRunner<T: Toolchain> {
    toolchain: T,
    options: RunnerOptions,
}

impl<T: Toolchain> ScriptRunner<T> {
    pub fn new(toolchain: T, options: RunnerOptions) -> Self {
        Self { toolchain, options }
    }

    /// Parse the script and synthesize its manifest
    pub fn plan(&self, script: &Path, mode: Mode) -> Result<Plan, ScriptError> {
        let parsed = parse_script(script, self.options.parse)?;
        let seed = script
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| FALLBACK_SEED.to_string());

        let manifest = manifest::synthesize(&parsed.metadata, &seed, &self.options.go_version);
        let file_name = workspace_file_name(&seed, mode);
        let binary_name = binary_name(&file_name);

        Ok(Plan {
            metadata: parsed.metadata,
            body: parsed.body,
            manifest,
            file_name,
            binary_name,
        })
    }

    /// Run one invocation; `Ok` means every step exited successfully
    pub fn invoke(&self, script: &Path, mode: Mode, args: &[String]) -> Result<(), ScriptError> {
        let plan = self.plan(script, mode)?;
        debug!(
            phase = "parse",
            path = %script.display(),
            dependency_count = plan.metadata.dependencies.len(),
            "script parsed"
        );

        let workspace = Workspace::create(
            self.options.workspace_dir.as_deref(),
            self.options.keep_workspace,
        )?;
        self.progress(format_args!("Workspace: {}", workspace.root().display()));

        workspace.write_manifest(&plan.manifest)?;
        workspace.write_script(&plan.file_name, &plan.body)?;

        self.progress(format_args!(
            "Resolving {} dependencies",
            plan.metadata.dependencies.len()
        ));
        let status = self.toolchain.reconcile(workspace.root())?;
        if !status.success() {
            return Err(ScriptError::Reconcile { status });
        }

        match mode {
            Mode::Run => {
                self.progress(format_args!("Building {}", plan.file_name));
                let status =
                    self.toolchain
                        .build(workspace.root(), &plan.file_name, &plan.binary_name)?;
                if !status.success() {
                    return Err(ScriptError::Build { status });
                }

                let binary = workspace.root().join(&plan.binary_name);
                info!(phase = "run", path = %binary.display(), "running script");
                let status = self.toolchain.run(&binary, args)?;
                if !status.success() {
                    return Err(ScriptError::Run { status });
                }
            }
            Mode::Test => {
                info!(phase = "test", path = %workspace.root().display(), "testing script");
                let status = self.toolchain.test(workspace.root(), args)?;
                if !status.success() {
                    return Err(ScriptError::Test { status });
                }
            }
        }

        Ok(())
    }

    fn progress(&self, message: std::fmt::Arguments<'_>) {
        if self.options.verbose {
            cli_utils::status(message);
        }
    }
}

/// Name the script copy so the toolchain accepts it.
///
/// A missing `.go` extension is added; test mode also requires `_test.go`.
pub fn workspace_file_name(file_name: &str, mode: Mode) -> String {
    let stem = file_name.strip_suffix(SOURCE_EXT).unwrap_or(file_name);

    match mode {
        Mode::Test if file_name.ends_with(TEST_SUFFIX) => file_name.to_string(),
        Mode::Test => format!("{stem}{TEST_SUFFIX}"),
        Mode::Run => format!("{stem}{SOURCE_EXT}"),
    }
}

/// Executable name for a workspace script file
pub fn binary_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(SOURCE_EXT).unwrap_or(file_name);
    format!("{stem}{}", std::env::consts::EXE_SUFFIX)
}
