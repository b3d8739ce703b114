use clap::Parser;

use gos::cli::{Cli, Commands};
use gos::script::ScriptError;
use gos::{cli_utils, commands, logging};

/// Exit status for usage errors and failures without a child status
const FAILURE: i32 = 1;

fn main() {
    // Initialize structured logging
    logging::init();

    // Usage errors exit with 1; --help and --version exit cleanly
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { FAILURE } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(&args),
        Commands::Test(args) => commands::test::run(&args),
    };

    // The workspace has already been dropped by the time we get here
    if let Err(e) = result {
        let script_error = e.downcast_ref::<ScriptError>();
        let code = script_error.map(ScriptError::exit_code).unwrap_or(FAILURE);
        tracing::debug!(
            phase = script_error.map(ScriptError::phase).unwrap_or("setup"),
            exit_code = code,
            "invocation failed"
        );
        cli_utils::failure(&format!("{e:#}"));
        std::process::exit(code);
    }
}
