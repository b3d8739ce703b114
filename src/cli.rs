use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// gos - run single-file Go scripts
///
/// Dependencies are declared inline in a `// /// script` comment block; gos
/// builds a throwaway module for the script and hands it to the Go toolchain.
#[derive(Parser, Debug)]
#[command(name = "gos")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Run single-file Go scripts with inline dependencies", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a Go script
    Run(ScriptArgs),

    /// Run tests in a Go script
    Test(ScriptArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ScriptArgs {
    /// Script file followed by arguments forwarded to the script (run) or to go test (test)
    #[arg(
        value_name = "SCRIPT [ARGS]",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub script_and_args: Vec<String>,

    /// Print the generated go.mod and planned commands without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Keep the temporary workspace after the invocation
    #[arg(long, env = "GOS_KEEP_WORKSPACE")]
    pub keep_workspace: bool,

    /// Treat unterminated metadata blocks as errors
    #[arg(long, env = "GOS_STRICT")]
    pub strict: bool,

    /// Config file path
    #[arg(short = 'c', long, env = "GOS_CONFIG")]
    pub config: Option<String>,

    /// Go executable
    #[arg(long, env = "GOS_GO")]
    pub go: Option<String>,

    /// Version for the go directive of the generated go.mod
    #[arg(long, env = "GOS_GO_VERSION")]
    pub go_version: Option<String>,

    /// Parent directory for temporary workspaces
    #[arg(long, env = "GOS_WORKSPACE_DIR")]
    pub workspace_dir: Option<PathBuf>,
}

impl ScriptArgs {
    /// Script path (first positional)
    pub fn script(&self) -> &Path {
        // clap guarantees at least one value
        Path::new(self.script_and_args.first().map(String::as_str).unwrap_or_default())
    }

    /// Arguments after the script path
    pub fn forwarded_args(&self) -> &[String] {
        self.script_and_args.get(1..).unwrap_or_default()
    }
}
