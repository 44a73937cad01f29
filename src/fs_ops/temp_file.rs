//! Temp file factory.
//!
//! Names are `<prefix><decimal suffix>` inside the chosen directory. Creation
//! is exclusive (O_EXCL), and a name collision simply draws a new suffix, up
//! to a fixed ceiling. Any other error is returned as-is, never retried.

use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::errors::{ReplaceError, Result};
use crate::platform;
use crate::platform::temp::next_suffix;

/// Collision retries before giving up.
pub const MAX_ATTEMPTS: u32 = 10_000;

/// Create a uniquely named temp file in `dir` with `mode` (subject to umask).
pub fn create_temp_file(dir: &Path, prefix: &OsStr, mode: u32) -> Result<(File, PathBuf)> {
    let (file, path) = with_unique_name(dir, prefix, MAX_ATTEMPTS, next_suffix, |p| {
        platform::open_exclusive(p, mode)
    })?;
    debug!(temp = %path.display(), mode = format!("{:o}", mode), "created temp file");
    Ok((file, path))
}

/// Run `create` on fresh candidate names until it stops failing with
/// `AlreadyExists`. Shared by temp files and temp symlinks.
pub(crate) fn with_unique_name<T>(
    dir: &Path,
    prefix: &OsStr,
    max_attempts: u32,
    mut next: impl FnMut() -> u64,
    mut create: impl FnMut(&Path) -> io::Result<T>,
) -> Result<(T, PathBuf)> {
    for attempt in 0..max_attempts {
        let mut name = OsString::from(prefix);
        name.push(next().to_string());
        let candidate = dir.join(name);
        match create(&candidate) {
            Ok(v) => return Ok((v, candidate)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                trace!(candidate = %candidate.display(), attempt, "temp name taken; retrying");
            }
            Err(e) => return Err(ReplaceError::from_io("create temp file", candidate, e)),
        }
    }
    Err(ReplaceError::RetryLimitExceeded {
        dir: dir.to_path_buf(),
        prefix: prefix.to_string_lossy().into_owned(),
        attempts: max_attempts,
    })
}
