//! Structured logging for gos
//!
//! Logs go to stderr so they never mix with a script's stdout. The default
//! level is `warn`: a normal invocation prints nothing but the toolchain's and
//! the script's own output.
//!
//! # Field conventions
//!
//! - `phase`: invocation phase (`parse`, `workspace`, `reconcile`, `build`, `run`, `test`)
//! - `path`: script or workspace path
//! - `dependency_count`: number of declared dependencies
//! - `exit_code`: child or process exit code
//!
//! ```rust,ignore
//! tracing::info!(phase = "run", path = %binary.display(), "running script");
//! ```

use std::{fmt as std_fmt, io};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{
    fmt::{self, format::Writer},
    prelude::*,
    EnvFilter,
};

const DEFAULT_FILTER: &str = "warn";

/// Single-line formatter tagging every event with `(gos)`
struct GosFormatter {
    ansi: bool,
}

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[31m",
        Level::WARN => "\x1b[33m",
        Level::INFO => "\x1b[32m",
        Level::DEBUG => "\x1b[34m",
        Level::TRACE => "\x1b[35m",
    }
}

impl<S, N> FormatEvent<S, N> for GosFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std_fmt::Result {
        let level = event.metadata().level();
        let timestamp = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.6f");
        let (color, reset) = if self.ansi {
            (level_color(level), "\x1b[0m")
        } else {
            ("", "")
        };

        write!(writer, "{timestamp} {color}{level:5}(gos){reset}: ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Log format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Colored single-line output
    Pretty,
    /// Single-line output without ANSI codes
    Compact,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse from `GOS_LOG_FORMAT`; defaults to compact under CI and when
    /// stderr is not a terminal
    pub fn from_env() -> Self {
        let requested = std::env::var("GOS_LOG_FORMAT").unwrap_or_default();
        let in_ci = std::env::var_os("CI").is_some();
        let tty = io::IsTerminal::is_terminal(&io::stderr());
        Self::resolve(&requested, in_ci, tty)
    }

    fn resolve(requested: &str, in_ci: bool, tty: bool) -> Self {
        match requested.to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            "pretty" => Self::Pretty,
            _ if in_ci || !tty => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

/// Initialize the global tracing subscriber
///
/// # Environment Variables
///
/// - `RUST_LOG`: log filter (default `warn`)
/// - `GOS_LOG_FORMAT`: `pretty`, `compact` or `json`
/// - `CI`: if set, defaults to compact format
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    match LogFormat::from_env() {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(io::stderr)
                    .json(),
            )
            .init(),
        format => registry
            .with(
                fmt::layer()
                    .event_format(GosFormatter {
                        ansi: format == LogFormat::Pretty,
                    })
                    .with_writer(io::stderr),
            )
            .init(),
    }
}
