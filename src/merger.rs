/// Configuration merger: CLI args > Env vars > Config file > Defaults
///
/// Environment variables are read by clap into the CLI args, so a single
/// `Option` check covers both of the top two layers.
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::ScriptArgs;
use crate::config::GosConfig;
use crate::script::{GoToolchain, ParseOptions, RunnerOptions};

/// Merged configuration for `run` and `test`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedScriptConfig {
    pub go: String,
    pub go_version: String,
    pub env: BTreeMap<String, String>,
    pub workspace_dir: Option<PathBuf>,
    pub keep_workspace: bool,
    pub strict: bool,
    pub verbose: bool,
}

impl MergedScriptConfig {
    pub fn merge(args: &ScriptArgs, file: GosConfig) -> Self {
        Self {
            go: args.go.clone().unwrap_or(file.toolchain.go),
            go_version: args
                .go_version
                .clone()
                .unwrap_or(file.toolchain.go_version),
            env: file.toolchain.env,
            workspace_dir: args
                .workspace_dir
                .clone()
                .or_else(|| file.workspace.dir.map(PathBuf::from)),
            keep_workspace: args.keep_workspace || file.workspace.keep,
            strict: args.strict || file.metadata.strict,
            verbose: args.verbose,
        }
    }

    pub fn runner_options(&self) -> RunnerOptions {
        RunnerOptions {
            go_version: self.go_version.clone(),
            workspace_dir: self.workspace_dir.clone(),
            keep_workspace: self.keep_workspace,
            parse: ParseOptions {
                strict: self.strict,
            },
            verbose: self.verbose,
        }
    }

    pub fn toolchain(&self) -> GoToolchain {
        GoToolchain::new(&self.go, self.env.clone(), self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn script_args(argv: &[&str]) -> ScriptArgs {
        match Cli::parse_from(argv).command {
            Commands::Run(args) | Commands::Test(args) => args,
        }
    }

    #[test]
    fn test_defaults_without_file() {
        let args = script_args(&["gos", "run", "x.go"]);
        let merged = MergedScriptConfig::merge(&args, GosConfig::default());

        // GOS_* variables may leak in from the environment running the tests
        if std::env::var_os("GOS_GO").is_none() {
            assert_eq!(merged.go, "go");
        }
        if std::env::var_os("GOS_GO_VERSION").is_none() {
            assert_eq!(merged.go_version, "1.21");
        }
        assert!(merged.env.is_empty());
        assert!(!merged.verbose);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = GosConfig::from_toml(
            r#"
            [toolchain]
            go = "go1.22"
            go_version = "1.22"
            env = { GOFLAGS = "-mod=mod" }

            [workspace]
            dir = "/from/file"
            "#,
        )
        .unwrap();

        let args = script_args(&[
            "gos",
            "run",
            "--go",
            "/opt/go/bin/go",
            "--workspace-dir",
            "/from/cli",
            "--strict",
            "x.go",
        ]);
        let merged = MergedScriptConfig::merge(&args, file);

        assert_eq!(merged.go, "/opt/go/bin/go");
        assert_eq!(merged.workspace_dir, Some(PathBuf::from("/from/cli")));
        assert_eq!(merged.env.get("GOFLAGS").map(String::as_str), Some("-mod=mod"));
        assert!(merged.strict);

        let options = merged.runner_options();
        assert!(options.parse.strict);
        assert_eq!(options.workspace_dir, Some(PathBuf::from("/from/cli")));
    }

    #[test]
    fn test_file_fills_missing_cli_values() {
        let file = GosConfig::from_toml("[workspace]\nkeep = true\n[metadata]\nstrict = true\n")
            .unwrap();
        let args = script_args(&["gos", "test", "x.go"]);
        let merged = MergedScriptConfig::merge(&args, file);

        assert!(merged.keep_workspace);
        assert!(merged.strict);
    }
}
