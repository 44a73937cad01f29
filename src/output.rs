//! User-facing CLI messages.
//!
//! Diagnostics go to stderr with a colored prefix when stderr is a TTY.
//! Command results go to stdout unadorned so scripts can parse them.

use owo_colors::OwoColorize;

fn stderr_is_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

fn prefixed(label: &str, msg: &str, paint: fn(&str) -> String) {
    if stderr_is_tty() {
        eprintln!("{} {}", paint(label), msg);
    } else {
        eprintln!("{} {}", label, msg);
    }
}

pub fn print_warn(msg: &str) {
    prefixed("warn:", msg, |s| s.yellow().bold().to_string());
}

pub fn print_error(msg: &str) {
    prefixed("error:", msg, |s| s.red().bold().to_string());
}

/// Print a plain result line (no prefix), e.g. one `temp-dir` row.
pub fn print_user(msg: &str) {
    println!("{}", msg);
}
