/// External Go toolchain invocation
///
/// Every command inherits the caller's standard streams so compiler
/// diagnostics, test output and interactive scripts pass straight through.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use tracing::debug;

use super::error::{Phase, ScriptError};
use crate::cli_utils;

/// The operations the orchestrator needs from a toolchain
pub trait Toolchain {
    /// Reconcile the manifest with the module graph (`go mod tidy`)
    fn reconcile(&self, dir: &Path) -> Result<ExitStatus, ScriptError>;

    /// Compile a single file in `dir` into the executable `output`
    fn build(&self, dir: &Path, script: &str, output: &str) -> Result<ExitStatus, ScriptError>;

    /// Execute a built binary
    fn run(&self, binary: &Path, args: &[String]) -> Result<ExitStatus, ScriptError>;

    /// Run the tests found in `dir`
    fn test(&self, dir: &Path, args: &[String]) -> Result<ExitStatus, ScriptError>;
}

/// Toolchain backed by the `go` command
#[derive(Debug, Clone)]
pub struct GoToolchain {
    go: PathBuf,
    env: BTreeMap<String, String>,
    verbose: bool,
}

impl GoToolchain {
    /// Resolve `go` from PATH, falling back to the name as given
    pub fn new(go: &str, env: BTreeMap<String, String>, verbose: bool) -> Self {
        let resolved = which::which(go).unwrap_or_else(|e| {
            debug!(program = go, error = %e, "could not resolve in PATH, trying as-is");
            PathBuf::from(go)
        });

        if verbose {
            cli_utils::status(format_args!("Using go: {}", resolved.display()));
        }

        Self {
            go: resolved,
            env,
            verbose,
        }
    }

    pub fn go(&self) -> &Path {
        &self.go
    }

    fn go_command(&self, dir: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.go);
        cmd.args(args).current_dir(dir).envs(&self.env);
        cmd
    }

    fn status(&self, phase: Phase, mut cmd: Command) -> Result<ExitStatus, ScriptError> {
        if self.verbose {
            cli_utils::status(format_args!("Command: {:?}", cmd));
        }

        let program = cmd.get_program().to_string_lossy().into_owned();
        let status = cmd
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| ScriptError::Spawn {
                phase,
                program,
                source,
            })?;

        debug!(phase = phase.as_str(), status = %status, "command finished");
        Ok(status)
    }
}

impl Toolchain for GoToolchain {
    fn reconcile(&self, dir: &Path) -> Result<ExitStatus, ScriptError> {
        let mut cmd = self.go_command(dir, &["mod", "tidy"]);
        cmd.stdin(Stdio::null());
        self.status(Phase::Reconcile, cmd)
    }

    fn build(&self, dir: &Path, script: &str, output: &str) -> Result<ExitStatus, ScriptError> {
        let mut cmd = self.go_command(dir, &["build", "-o", output, script]);
        cmd.stdin(Stdio::null());
        self.status(Phase::Build, cmd)
    }

    fn run(&self, binary: &Path, args: &[String]) -> Result<ExitStatus, ScriptError> {
        // The script runs from the caller's working directory, not the workspace
        let mut cmd = Command::new(binary);
        cmd.args(args).stdin(Stdio::inherit());
        self.status(Phase::Run, cmd)
    }

    fn test(&self, dir: &Path, args: &[String]) -> Result<ExitStatus, ScriptError> {
        let mut cmd = self.go_command(dir, &["test", "-v", "."]);
        cmd.args(args).stdin(Stdio::inherit());
        self.status(Phase::Test, cmd)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Write a stand-in `go` that logs its arguments and working directory
    fn fake_go(dir: &Path, exit_code: i32) -> PathBuf {
        let go = dir.join("go");
        let log = dir.join("calls.log");
        fs::write(
            &go,
            format!(
                "#!/bin/sh\necho \"$(pwd)|$*|$GOFLAGS\" >> '{}'\nexit {}\n",
                log.display(),
                exit_code
            ),
        )
        .unwrap();
        let mut perms = fs::metadata(&go).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&go, perms).unwrap();
        go
    }

    fn calls(dir: &Path) -> String {
        fs::read_to_string(dir.join("calls.log")).unwrap()
    }

    #[test]
    fn test_reconcile_runs_mod_tidy_in_workspace() {
        let bin = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let go = fake_go(bin.path(), 0);

        let mut env = BTreeMap::new();
        env.insert("GOFLAGS".to_string(), "-mod=mod".to_string());
        let toolchain = GoToolchain::new(go.to_str().unwrap(), env, false);

        let status = toolchain.reconcile(work.path()).unwrap();
        assert!(status.success());

        let log = calls(bin.path());
        let work_dir = work.path().canonicalize().unwrap();
        assert!(log.contains(&format!("{}|mod tidy|-mod=mod", work_dir.display())));
    }

    #[test]
    fn test_build_and_test_arguments() {
        let bin = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let go = fake_go(bin.path(), 0);
        let toolchain = GoToolchain::new(go.to_str().unwrap(), BTreeMap::new(), false);

        toolchain.build(work.path(), "hello.go", "hello").unwrap();
        toolchain
            .test(work.path(), &["-run".to_string(), "TestAdd".to_string()])
            .unwrap();

        let log = calls(bin.path());
        assert!(log.contains("|build -o hello hello.go|"));
        assert!(log.contains("|test -v . -run TestAdd|"));
    }

    #[test]
    fn test_non_zero_status_is_returned() {
        let bin = TempDir::new().unwrap();
        let go = fake_go(bin.path(), 3);
        let toolchain = GoToolchain::new(go.to_str().unwrap(), BTreeMap::new(), false);

        let status = toolchain.reconcile(bin.path()).unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn test_missing_go_fails_in_reconcile_phase() {
        let work = TempDir::new().unwrap();
        let toolchain = GoToolchain::new(
            "/nonexistent/path/to/go",
            BTreeMap::new(),
            false,
        );

        let err = toolchain.reconcile(work.path()).unwrap_err();
        assert!(matches!(
            err,
            ScriptError::Spawn {
                phase: Phase::Reconcile,
                ..
            }
        ));
        assert_eq!(err.phase(), "reconcile");
        assert!(err.to_string().starts_with("Failed to run go mod tidy: failed to spawn"));
    }

    #[test]
    fn test_missing_go_fails_in_build_phase() {
        let work = TempDir::new().unwrap();
        let toolchain = GoToolchain::new(
            "/nonexistent/path/to/go",
            BTreeMap::new(),
            false,
        );

        let err = toolchain.build(work.path(), "hello.go", "hello").unwrap_err();
        assert_eq!(err.phase(), "build");
        assert!(err.to_string().starts_with("Failed to build script: failed to spawn"));
        assert!(err.to_string().contains("/nonexistent/path/to/go"));
    }

    #[test]
    fn test_missing_binary_fails_in_run_phase() {
        let work = TempDir::new().unwrap();
        let toolchain = GoToolchain::new("go", BTreeMap::new(), false);

        let err = toolchain
            .run(&work.path().join("not-built"), &[])
            .unwrap_err();
        assert_eq!(err.phase(), "run");
        assert!(err.to_string().starts_with("Failed to run script: failed to spawn"));
    }
}
