/// Disposable per-invocation workspace
///
/// Owns a uniquely named temporary directory that is removed when the
/// workspace is dropped, on success and failure paths alike.
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use super::error::ScriptError;
use super::manifest::MANIFEST_FILE;
use crate::cli_utils;

const DIR_PREFIX: &str = "gos-";

pub struct Workspace {
    dir: Option<TempDir>,
    root: PathBuf,
    keep: bool,
}

impl Workspace {
    /// Create a fresh directory under `parent` (system temp dir if `None`)
    pub fn create(parent: Option<&Path>, keep: bool) -> Result<Self, ScriptError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(DIR_PREFIX);

        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(ScriptError::WorkspaceCreate)?;

        let root = dir.path().to_path_buf();
        debug!(path = %root.display(), "workspace created");

        Ok(Self {
            dir: Some(dir),
            root,
            keep,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write go.mod into the workspace
    pub fn write_manifest(&self, contents: &str) -> Result<PathBuf, ScriptError> {
        let path = self.root.join(MANIFEST_FILE);
        fs::write(&path, contents).map_err(|source| ScriptError::ManifestWrite {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Write the script body under `file_name`
    pub fn write_script(&self, file_name: &str, body: &str) -> Result<PathBuf, ScriptError> {
        let path = self.root.join(file_name);
        fs::write(&path, body).map_err(|source| ScriptError::ScriptWrite {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };

        if self.keep {
            let path = dir.keep();
            info!(path = %path.display(), "keeping workspace");
            cli_utils::status(format_args!("Workspace kept at {}", path.display()));
            return;
        }

        match dir.close() {
            Ok(()) => debug!(path = %self.root.display(), "workspace removed"),
            Err(e) => warn!(
                path = %self.root.display(),
                error = %e,
                "failed to remove workspace"
            ),
        }
    }
}
