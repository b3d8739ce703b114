/// Prefixed status output on stderr
use std::fmt;
use std::io::IsTerminal;

/// `[gos]`, bright cyan when stderr is a TTY
pub fn gos_prefix() -> &'static str {
    if std::io::stderr().is_terminal() {
        "\x1b[96m[gos]\x1b[0m"
    } else {
        "[gos]"
    }
}

/// Print one `[gos]`-prefixed line to stderr
pub fn status(message: fmt::Arguments<'_>) {
    eprintln!("{} {}", gos_prefix(), message);
}

/// Print a fatal message for a failed invocation
///
/// Red when stderr is a TTY so it stands out from toolchain output.
pub fn failure(message: &str) {
    if std::io::stderr().is_terminal() {
        eprintln!("{} \x1b[31merror:\x1b[0m {}", gos_prefix(), message);
    } else {
        eprintln!("{} error: {}", gos_prefix(), message);
    }
}
