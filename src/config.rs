use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::script::manifest::DEFAULT_GO_VERSION;

/// Complete gos configuration (loaded from TOML file)
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct GosConfig {
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub workspace: WorkspaceConfig,

    #[serde(default)]
    pub metadata: MetadataConfig,
}

/// How the Go toolchain is invoked
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ToolchainConfig {
    /// `go` executable (name looked up in PATH, or a path)
    #[serde(default = "default_go")]
    pub go: String,

    /// Version written to the `go` directive of the generated go.mod
    #[serde(default = "default_go_version")]
    pub go_version: String,

    /// Extra environment variables for every toolchain command (e.g. GOFLAGS, GOPROXY)
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            go: default_go(),
            go_version: default_go_version(),
            env: BTreeMap::new(),
        }
    }
}

/// Temporary workspace settings
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct WorkspaceConfig {
    /// Parent directory for workspaces (default: system temp dir)
    #[serde(default)]
    pub dir: Option<String>,

    /// Leave the workspace on disk after the invocation
    #[serde(default)]
    pub keep: bool,
}

/// Metadata parsing settings
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub struct MetadataConfig {
    /// Fail on unterminated metadata blocks instead of ignoring them
    #[serde(default)]
    pub strict: bool,
}

fn default_go() -> String {
    "go".to_string()
}

fn default_go_version() -> String {
    DEFAULT_GO_VERSION.to_string()
}

impl GosConfig {
    /// Load configuration from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = GosConfig::from_toml("").unwrap();
        assert_eq!(config, GosConfig::default());
        assert_eq!(config.toolchain.go, "go");
        assert_eq!(config.toolchain.go_version, "1.21");
        assert!(!config.workspace.keep);
        assert!(!config.metadata.strict);
    }

    #[test]
    fn test_full_config() {
        let config = GosConfig::from_toml(
            r#"
            [toolchain]
            go = "/usr/local/go/bin/go"
            go_version = "1.22"

            [toolchain.env]
            GOFLAGS = "-mod=mod"
            GOPROXY = "off"

            [workspace]
            dir = "/var/tmp"
            keep = true

            [metadata]
            strict = true
            "#,
        )
        .unwrap();

        assert_eq!(config.toolchain.go, "/usr/local/go/bin/go");
        assert_eq!(config.toolchain.go_version, "1.22");
        assert_eq!(config.toolchain.env.get("GOPROXY").map(String::as_str), Some("off"));
        assert_eq!(config.workspace.dir.as_deref(), Some("/var/tmp"));
        assert!(config.workspace.keep);
        assert!(config.metadata.strict);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gos.toml");
        fs::write(&path, "[toolchain\n").unwrap();

        let err = GosConfig::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("gos.toml"));
    }
}
