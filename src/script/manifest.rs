/// go.mod synthesis for a throwaway script workspace
use std::path::Path;

use super::metadata::ScriptMetadata;

/// Manifest file name inside the workspace
pub const MANIFEST_FILE: &str = "go.mod";

/// Default `go` directive
pub const DEFAULT_GO_VERSION: &str = "1.21";

/// Version requested for dependencies declared without `@version`
pub const LATEST: &str = "latest";

/// Seed used when the script has no usable file name
pub const FALLBACK_SEED: &str = "script";

/// A dependency reference split into module path and optional version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyRef<'a> {
    pub module: &'a str,
    pub version: Option<&'a str>,
}

impl<'a> DependencyRef<'a> {
    /// Split on the last `@`; an empty version counts as absent
    pub fn parse(reference: &'a str) -> Self {
        match reference.rsplit_once('@') {
            Some((module, version)) if !version.is_empty() => Self {
                module,
                version: Some(version),
            },
            Some((module, _)) => Self {
                module,
                version: None,
            },
            None => Self {
                module: reference,
                version: None,
            },
        }
    }

    /// Version string written into the requirement line
    pub fn requirement(&self) -> &'a str {
        self.version.unwrap_or(LATEST)
    }
}

/// Derive a module identifier from a file name.
///
/// The extension is dropped and every character outside `[A-Za-z0-9_]` is
/// replaced by a single `_`.
pub fn project_identifier(seed: &str) -> String {
    let stem = Path::new(seed)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let stem = if stem.is_empty() {
        FALLBACK_SEED.to_string()
    } else {
        stem
    };

    stem.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Render the complete go.mod for a script
pub fn synthesize(metadata: &ScriptMetadata, seed: &str, go_version: &str) -> String {
    let mut manifest = format!(
        "module {}\n\ngo {}\n",
        project_identifier(seed),
        go_version
    );

    if !metadata.dependencies.is_empty() {
        manifest.push_str("\nrequire (\n");
        for reference in &metadata.dependencies {
            let dep = DependencyRef::parse(reference);
            manifest.push_str(&format!("\t{} {}\n", dep.module, dep.requirement()));
        }
        manifest.push_str(")\n");
    }

    manifest
}
