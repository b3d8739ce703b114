/// `gos run` command implementation
///
/// Builds the script in a throwaway module and executes it.
use anyhow::{Context, Result};
use std::io::Write;

use crate::cli::ScriptArgs;
use crate::config_discovery::load_config_with_discovery;
use crate::merger::MergedScriptConfig;
use crate::script::orchestrator::Plan;
use crate::script::{Mode, ScriptRunner};

pub fn run(args: &ScriptArgs) -> Result<()> {
    execute(args, Mode::Run)
}

/// Shared by `run` and `test`
pub(crate) fn execute(args: &ScriptArgs, mode: Mode) -> Result<()> {
    let file_config = load_config_with_discovery(args.config.as_deref())?;
    let config = MergedScriptConfig::merge(args, file_config);
    let toolchain = config.toolchain();
    let go = toolchain.go().display().to_string();
    let runner = ScriptRunner::new(toolchain, config.runner_options());

    let script = args.script();
    let forwarded = args.forwarded_args();

    if args.dry_run {
        let plan = runner.plan(script, mode)?;
        return print_plan(&plan, mode, &go, forwarded);
    }

    tracing::debug!(
        phase = mode.as_str(),
        path = %script.display(),
        args = forwarded.len(),
        "starting invocation"
    );
    runner.invoke(script, mode, forwarded)?;
    Ok(())
}

fn print_plan(plan: &Plan, mode: Mode, go: &str, args: &[String]) -> Result<()> {
    let mut out = std::io::stdout().lock();
    let rest = if args.is_empty() {
        String::new()
    } else {
        format!(" {}", args.join(" "))
    };

    writeln!(out, "# {}", crate::script::manifest::MANIFEST_FILE)?;
    write!(out, "{}", plan.manifest)?;
    writeln!(out)?;
    writeln!(
        out,
        "# script: {} ({} dependencies)",
        plan.file_name,
        plan.metadata.dependencies.len()
    )?;
    writeln!(out, "# commands")?;
    writeln!(out, "{go} mod tidy")?;
    match mode {
        Mode::Run => {
            writeln!(out, "{go} build -o {} {}", plan.binary_name, plan.file_name)?;
            writeln!(out, "./{}{}", plan.binary_name, rest)?;
        }
        Mode::Test => writeln!(out, "{go} test -v .{rest}")?,
    }

    out.flush().context("Failed to write plan")
}
