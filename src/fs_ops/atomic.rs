//! Atomic rename helper.
//! - Renames the temp path over the destination with context-rich errors.
//! - EXDEV is reported as `CrossDevice`; there is no copy fallback.
//! - Optional best-effort fsync of the destination directory after rename.

use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::warn;

use super::temp_dir::destination_dir;
use crate::errors::{ReplaceError, Result};

/// Rename `src` onto `dst`, replacing whatever `dst` was.
pub fn replace(src: &Path, dst: &Path) -> Result<()> {
    fs::rename(src, dst).map_err(|e| ReplaceError::from_rename(src, dst, e))
}

/// fsync the directory containing `dst`; failures are logged, not returned,
/// so a successful rename never turns into an error.
pub fn sync_parent_dir(dst: &Path) {
    let dir = destination_dir(dst);
    if let Err(e) = fsync_dir(&dir) {
        warn!(dir = %dir.display(), error = %e, "failed to fsync destination directory");
    }
}

#[cfg(unix)]
fn fsync_dir(dir: &Path) -> io::Result<()> {
    let f = File::open(dir)?;
    f.sync_all()
}

#[cfg(not(unix))]
fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
