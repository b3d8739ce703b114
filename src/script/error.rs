/// Errors raised while preparing, building and running a script
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// External toolchain step an invocation was in when a child failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Reconcile,
    Build,
    Run,
    Test,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reconcile => "reconcile",
            Self::Build => "build",
            Self::Run => "run",
            Self::Test => "test",
        }
    }

    /// Action wording shared by spawn and exit-status messages
    fn action(&self) -> &'static str {
        match self {
            Self::Reconcile => "run go mod tidy",
            Self::Build => "build script",
            Self::Run => "run script",
            Self::Test => "test script",
        }
    }
}

#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("Failed to parse script {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse script {}: {message} (line {line})", path.display())]
    Metadata {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Failed to create temp directory: {0}")]
    WorkspaceCreate(#[source] io::Error),

    #[error("Failed to generate go.mod in {}: {source}", path.display())]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write script {}: {source}", path.display())]
    ScriptWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to {}: failed to spawn {program}: {source}", phase.action())]
    Spawn {
        phase: Phase,
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to run go mod tidy: {status}")]
    Reconcile { status: ExitStatus },

    #[error("Failed to build script: build failed: {status}")]
    Build { status: ExitStatus },

    #[error("Failed to run script: {status}")]
    Run { status: ExitStatus },

    #[error("Failed to test script: {status}")]
    Test { status: ExitStatus },
}

impl ScriptError {
    /// Phase name used in structured logs
    pub fn phase(&self) -> &'static str {
        match self {
            Self::Read { .. } | Self::Metadata { .. } => "parse",
            Self::WorkspaceCreate(_) => "workspace",
            Self::ManifestWrite { .. } => "manifest",
            Self::ScriptWrite { .. } => "script",
            Self::Spawn { phase, .. } => phase.as_str(),
            Self::Reconcile { .. } => "reconcile",
            Self::Build { .. } => "build",
            Self::Run { .. } => "run",
            Self::Test { .. } => "test",
        }
    }

    /// Process exit status for this failure.
    ///
    /// Reconcile, run and test failures carry the child's own status through;
    /// everything else (including build failures) maps to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Reconcile { status } | Self::Run { status } | Self::Test { status } => {
                exit_code_of(*status)
            }
            _ => 1,
        }
    }
}

/// Translate a child's exit status into a process exit code.
///
/// A child terminated by a signal reports `128 + signal` on Unix, like a shell.
pub fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn status(raw: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(raw)
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_code_passes_child_status_through() {
        // Raw wait status: exit code lives in the high byte
        let err = ScriptError::Reconcile {
            status: status(3 << 8),
        };
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.phase(), "reconcile");

        let err = ScriptError::Run {
            status: status(42 << 8),
        };
        assert_eq!(err.exit_code(), 42);
    }

    #[cfg(unix)]
    #[test]
    fn test_build_failure_uses_fixed_status() {
        let err = ScriptError::Build {
            status: status(2 << 8),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.to_string().starts_with("Failed to build script"));
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_maps_to_shell_convention() {
        // SIGKILL
        assert_eq!(exit_code_of(status(9)), 137);
    }

    #[test]
    fn test_messages_identify_phase() {
        let err = ScriptError::WorkspaceCreate(io::Error::other("disk full"));
        assert_eq!(err.to_string(), "Failed to create temp directory: disk full");
        assert_eq!(err.exit_code(), 1);

        let err = ScriptError::Read {
            path: PathBuf::from("missing.go"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("missing.go"));
        assert_eq!(err.phase(), "parse");
    }

    #[test]
    fn test_spawn_failure_names_its_phase() {
        let err = ScriptError::Spawn {
            phase: Phase::Reconcile,
            program: "/opt/go/bin/go".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(
            err.to_string(),
            "Failed to run go mod tidy: failed to spawn /opt/go/bin/go: not found"
        );
        assert_eq!(err.phase(), "reconcile");
        assert_eq!(err.exit_code(), 1);

        let err = ScriptError::Spawn {
            phase: Phase::Test,
            program: "go".to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("Failed to test script: failed to spawn go"));
        assert_eq!(err.phase(), "test");
    }
}
