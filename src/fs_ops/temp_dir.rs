//! Candidate-directory resolution.
//!
//! The final rename is only atomic when the temp file and the destination
//! live on the same filesystem. A configured scratch directory (TMPDIR) is
//! preferred only when its device matches the destination directory's
//! device; otherwise the destination's own directory hosts the temp file.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::Environment;
use crate::platform;

/// Directory containing `dest` ("." for a bare file name).
pub fn destination_dir(dest: &Path) -> PathBuf {
    match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Pick the directory that will host the temp file for `dest`.
///
/// An explicit override is returned unchanged. Failing to stat the preferred
/// directory never fails the resolution; it only makes it non-viable.
pub fn resolve_temp_dir(dest: &Path, explicit: Option<&Path>, env: &Environment) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    let fallback = destination_dir(dest);

    let Some(preferred) = env.preferred_temp_dir.as_deref() else {
        debug!(dest = %dest.display(), dir = %fallback.display(), "no preferred temp dir; using destination dir");
        return fallback;
    };

    if same_device(preferred, &fallback) {
        debug!(dest = %dest.display(), dir = %preferred.display(), "preferred temp dir shares the destination device");
        preferred.to_path_buf()
    } else {
        debug!(
            dest = %dest.display(),
            preferred = %preferred.display(),
            dir = %fallback.display(),
            "preferred temp dir not viable; using destination dir"
        );
        fallback
    }
}

/// Resolve the temp directory for `dest` using the running process's
/// environment. Handy to pre-compute once for many writes to one directory.
pub fn temp_dir(dest: impl AsRef<Path>) -> PathBuf {
    resolve_temp_dir(dest.as_ref(), None, &Environment::from_process())
}

/// True only when both paths are directories that can be stat'ed and share
/// a device.
pub(crate) fn same_device(a: &Path, b: &Path) -> bool {
    if !a.is_dir() {
        return false;
    }
    match (platform::device_id(a), platform::device_id(b)) {
        (Ok(da), Ok(db)) => da == db,
        _ => false,
    }
}
