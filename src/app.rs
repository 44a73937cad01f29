//! Application orchestrator.
//! Initializes logging, dispatches the subcommand, and reports typed failures
//! as structured log events.

use anyhow::Result;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, error, info};

use atomic_replace::cli::{Args, Command, WriteArgs};
use atomic_replace::output as out;
use atomic_replace::{PendingReplacement, ReplaceError, TempDirCache, symlink, temp_dir};

use crate::logging::init_tracing;

/// Run the CLI application.
pub fn run(args: Args) -> Result<()> {
    let level = args.effective_log_level();
    let guard = init_tracing(&level, args.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;

    debug!("Starting atomic_replace: {:?}", args);

    let result = match &args.command {
        Command::Write(w) => run_write(w),
        Command::TempDir { dests } => {
            run_temp_dir(dests);
            Ok(())
        }
        Command::Symlink { target, link } => symlink(target, link).map(|()| {
            info!(link = %link.display(), target = %target.display(), "Symlink replaced");
        }),
    };

    if let Err(e) = &result {
        log_failure(e);
    }

    // Flush the file appender before exit.
    drop(guard);
    result.map_err(anyhow::Error::from)
}

fn run_write(w: &WriteArgs) -> atomic_replace::Result<()> {
    let mut pending = PendingReplacement::new(&w.dest, &w.to_options())?;
    let copied = match &w.input {
        Some(path) => {
            let f = File::open(path).map_err(|e| ReplaceError::from_io("open input", path, e))?;
            copy_into(f, &mut pending)?
        }
        None => copy_into(io::stdin().lock(), &mut pending)?,
    };
    pending.commit()?;
    info!(
        dest = %w.dest.display(),
        bytes = copied,
        mode = format!("{:o}", pending.mode_plan().effective_mode),
        "Replacement committed"
    );
    Ok(())
}

fn copy_into(mut src: impl Read, pending: &mut PendingReplacement) -> atomic_replace::Result<u64> {
    let n = io::copy(&mut src, pending)
        .map_err(|e| ReplaceError::from_io("write temp file", pending.temp_path(), e))?;
    pending
        .flush()
        .map_err(|e| ReplaceError::from_io("flush temp file", pending.temp_path(), e))?;
    Ok(n)
}

fn run_temp_dir(dests: &[PathBuf]) {
    let cache = TempDirCache::new();
    for dest in dests {
        let direct = temp_dir(dest);
        let cached = cache.get(dest);
        out::print_user(&format!("{}\t{}\t{}", dest.display(), direct.display(), cached.display()));
    }
}

fn log_failure(e: &ReplaceError) {
    let code = e.code();
    let kind = e.kind();
    match e {
        ReplaceError::NotFound { op, path, .. } | ReplaceError::PermissionDenied { op, path, .. } => {
            error!(code, kind, op, path = %path.display(), "Replacement failed")
        }
        ReplaceError::Io { op, path, source } => {
            error!(code, kind, op, path = %path.display(), error = %source, "Replacement failed")
        }
        ReplaceError::CrossDevice { from, to } => {
            error!(code, kind, from = %from.display(), to = %to.display(), "Replacement failed")
        }
        ReplaceError::RetryLimitExceeded { dir, prefix, attempts } => {
            error!(code, kind, dir = %dir.display(), %prefix, attempts = *attempts, "Replacement failed")
        }
        ReplaceError::Closed { path } => {
            error!(code, kind, path = %path.display(), "Replacement failed")
        }
        ReplaceError::Unsupported { op } => {
            error!(code, kind, op, "Replacement failed")
        }
    }
}
