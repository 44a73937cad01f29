//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - Without either flag, ATOMIC_REPLACE_LOG supplies the log level.
//! - Modes are octal, with or without a leading `0` / `0o`.

use clap::{Args as ClapArgs, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

use crate::config::{LogLevel, Options, Owner};

/// Environment variable consulted for the log level when no flag is given.
pub const LOG_ENV: &str = "ATOMIC_REPLACE_LOG";

/// CLI wrapper for the atomic_replace library.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Atomically create or replace files and symlinks"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(
        short = 'd',
        long,
        global = true,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, global = true, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Also append logs to this file (created 0600; refused behind symlinked ancestors).
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, global = true, help = "Emit logs in structured JSON")]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Replace DEST with the content of stdin (or --input) atomically.
    Write(WriteArgs),

    /// Print the directory that would host temp files for each DEST.
    #[command(name = "temp-dir")]
    TempDir {
        #[arg(required = true, value_hint = ValueHint::AnyPath)]
        dests: Vec<PathBuf>,
    },

    /// Point LINK at TARGET atomically, replacing an existing LINK.
    Symlink {
        #[arg(value_hint = ValueHint::AnyPath)]
        target: PathBuf,
        #[arg(value_hint = ValueHint::AnyPath)]
        link: PathBuf,
    },
}

#[derive(ClapArgs, Debug, Clone)]
pub struct WriteArgs {
    /// File to replace.
    #[arg(value_hint = ValueHint::AnyPath)]
    pub dest: PathBuf,

    /// Read content from FILE instead of stdin.
    #[arg(long, short = 'i', value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Requested mode (octal), subject to the umask unless --ignore-umask.
    #[arg(long, value_parser = parse_octal)]
    pub mode: Option<u32>,

    /// Exact mode (octal), never masked; wins over everything else.
    #[arg(long, value_parser = parse_octal)]
    pub static_mode: Option<u32>,

    /// Keep the mode of an existing DEST.
    #[arg(long)]
    pub existing_permissions: bool,

    /// Apply --mode (or the 0600 default) verbatim.
    #[arg(long)]
    pub ignore_umask: bool,

    /// Directory for the temp file; must be on DEST's filesystem.
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub temp_dir: Option<PathBuf>,

    /// Skip fsync of the temp file before renaming.
    #[arg(long)]
    pub no_sync: bool,

    /// fsync DEST's directory after renaming.
    #[arg(long)]
    pub sync_dir: bool,

    /// Numeric owner to set on the new file.
    #[arg(long)]
    pub uid: Option<u32>,

    /// Numeric group to set on the new file.
    #[arg(long)]
    pub gid: Option<u32>,
}

impl WriteArgs {
    /// Translate flags into library options.
    pub fn to_options(&self) -> Options {
        let mut opts = Options::new()
            .sync(!self.no_sync)
            .sync_dir(self.sync_dir)
            .owner(Owner::new(self.uid, self.gid));
        if let Some(m) = self.mode {
            opts = opts.mode(m);
        }
        if let Some(m) = self.static_mode {
            opts = opts.static_mode(m);
        }
        if self.existing_permissions {
            opts = opts.existing_permissions();
        }
        if self.ignore_umask {
            opts = opts.ignore_umask();
        }
        if let Some(d) = &self.temp_dir {
            opts = opts.temp_dir(d);
        }
        opts
    }
}

impl Args {
    /// Effective log level derived from flags and the environment.
    /// Precedence: --debug > --log-level value > ATOMIC_REPLACE_LOG > default.
    pub fn effective_log_level(&self) -> LogLevel {
        self.log_level_from(std::env::var(LOG_ENV).ok().as_deref())
    }

    fn log_level_from(&self, env_value: Option<&str>) -> LogLevel {
        if self.debug {
            return LogLevel::Debug;
        }
        self.log_level
            .as_deref()
            .and_then(LogLevel::parse)
            .or_else(|| env_value.and_then(LogLevel::parse))
            .unwrap_or_default()
    }
}

/// Parse an octal permission string such as `644`, `0644` or `0o4755`.
pub fn parse_octal(s: &str) -> Result<u32, String> {
    let t = s.trim();
    let digits = t.strip_prefix("0o").unwrap_or(t);
    let mode = u32::from_str_radix(digits, 8).map_err(|_| format!("'{s}' is not an octal mode"))?;
    if mode > 0o7777 {
        return Err(format!("'{s}' is out of range (max 7777)"));
    }
    Ok(mode)
}

pub fn parse() -> Args {
    Args::parse()
}
