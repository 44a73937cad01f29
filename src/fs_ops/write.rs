//! One-shot conveniences built on the pending replacement.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, warn};

use super::atomic;
use super::pending::PendingReplacement;
use super::temp_dir::destination_dir;
use super::temp_file::{MAX_ATTEMPTS, with_unique_name};
use crate::config::Options;
use crate::errors::{ReplaceError, Result};
use crate::platform;
use crate::platform::temp::next_suffix;

/// Atomically replace `path` with `data`, carrying exactly `mode`.
///
/// Like `fs::write`, but readers see either the old content or `data`, never
/// a partial file. On error the temp file is removed and `path` is untouched.
pub fn write_file(path: impl AsRef<Path>, data: &[u8], mode: u32) -> Result<()> {
    let path = path.as_ref();
    let mut pending = PendingReplacement::new(path, &Options::new().static_mode(mode))?;
    pending
        .write_all(data)
        .map_err(|e| ReplaceError::from_io("write temp file", pending.temp_path(), e))?;
    pending.commit()?;
    debug!(dest = %path.display(), bytes = data.len(), "wrote file atomically");
    Ok(())
}

/// Atomically point `link` at `target`, replacing an existing `link`.
///
/// A uniquely named symlink is created next to `link` and renamed over it.
pub fn symlink(target: impl AsRef<Path>, link: impl AsRef<Path>) -> Result<()> {
    let target = target.as_ref();
    let link = link.as_ref();
    let name = link.file_name().ok_or_else(|| {
        ReplaceError::from_io(
            "derive temp symlink name",
            link,
            io::Error::new(io::ErrorKind::InvalidInput, "link has no file name"),
        )
    })?;
    let mut prefix = OsString::from(".");
    prefix.push(name);

    let dir = destination_dir(link);
    let ((), temp) = with_unique_name(&dir, &prefix, MAX_ATTEMPTS, next_suffix, |p| {
        platform::symlink(target, p)
    })?;

    if let Err(e) = atomic::replace(&temp, link) {
        if let Err(rm) = fs::remove_file(&temp) {
            warn!(temp = %temp.display(), error = %rm, "failed to remove temp symlink");
        }
        return Err(e);
    }
    debug!(link = %link.display(), target = %target.display(), "replaced symlink atomically");
    Ok(())
}
