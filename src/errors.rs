//! Typed error definitions for atomic_replace.
//! Provides a small set of well-known failure modes for better logs and tests.
//!
//! Every I/O failure carries the operation and path it happened on. Display
//! output appends a platform-aware hint (e.g. "insufficient space on device")
//! derived from the raw OS code, so CLI users get something actionable.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ReplaceError>;

#[derive(Debug, Error)]
pub enum ReplaceError {
    #[error("{op} '{}': {source}{}", .path.display(), Hint(.source))]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{op} '{}': not found{}", .path.display(), Hint(.source))]
    NotFound {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{op} '{}': permission denied{}", .path.display(), Hint(.source))]
    PermissionDenied {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "cannot rename '{}' -> '{}' across filesystems; atomic replacement not possible",
        .from.display(),
        .to.display()
    )]
    CrossDevice { from: PathBuf, to: PathBuf },

    #[error(
        "gave up creating a temp file '{prefix}*' in '{}' after {attempts} name collisions",
        .dir.display()
    )]
    RetryLimitExceeded {
        dir: PathBuf,
        prefix: String,
        attempts: u32,
    },

    #[error("pending replacement of '{}' is already closed", .path.display())]
    Closed { path: PathBuf },

    #[error("{op} is not supported on this platform")]
    Unsupported { op: &'static str },
}

impl ReplaceError {
    /// Classify an `io::Error` raised by `op` on `path`.
    ///
    /// EXDEV becomes `CrossDevice` with `path` on both sides; callers that know
    /// both ends of a rename should use [`ReplaceError::from_rename`].
    pub fn from_io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if is_cross_device(&source) {
            return ReplaceError::CrossDevice {
                from: path.clone(),
                to: path,
            };
        }
        match source.kind() {
            io::ErrorKind::NotFound => ReplaceError::NotFound { op, path, source },
            io::ErrorKind::PermissionDenied => ReplaceError::PermissionDenied { op, path, source },
            io::ErrorKind::Unsupported => ReplaceError::Unsupported { op },
            _ => ReplaceError::Io { op, path, source },
        }
    }

    /// Classify a failed `rename(from, to)`.
    pub fn from_rename(from: &Path, to: &Path, source: io::Error) -> Self {
        if is_cross_device(&source) {
            ReplaceError::CrossDevice {
                from: from.to_path_buf(),
                to: to.to_path_buf(),
            }
        } else {
            Self::from_io("rename temp file over destination", to, source)
        }
    }

    /// Stable numeric code per variant (CLI exit status and log field).
    pub fn code(&self) -> i32 {
        match self {
            ReplaceError::Io { .. } => 10,
            ReplaceError::NotFound { .. } => 11,
            ReplaceError::PermissionDenied { .. } => 12,
            ReplaceError::CrossDevice { .. } => 13,
            ReplaceError::RetryLimitExceeded { .. } => 14,
            ReplaceError::Closed { .. } => 15,
            ReplaceError::Unsupported { .. } => 16,
        }
    }

    /// Short snake_case name for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ReplaceError::Io { .. } => "io",
            ReplaceError::NotFound { .. } => "not_found",
            ReplaceError::PermissionDenied { .. } => "permission_denied",
            ReplaceError::CrossDevice { .. } => "cross_device",
            ReplaceError::RetryLimitExceeded { .. } => "retry_limit_exceeded",
            ReplaceError::Closed { .. } => "closed",
            ReplaceError::Unsupported { .. } => "unsupported",
        }
    }

    fn io_kind(&self) -> io::ErrorKind {
        match self {
            ReplaceError::Io { source, .. } => source.kind(),
            ReplaceError::NotFound { .. } => io::ErrorKind::NotFound,
            ReplaceError::PermissionDenied { .. } => io::ErrorKind::PermissionDenied,
            ReplaceError::CrossDevice { .. } => io::ErrorKind::CrossesDevices,
            ReplaceError::RetryLimitExceeded { .. } => io::ErrorKind::AlreadyExists,
            ReplaceError::Closed { .. } => io::ErrorKind::BrokenPipe,
            ReplaceError::Unsupported { .. } => io::ErrorKind::Unsupported,
        }
    }
}

/// Lets `PendingReplacement` speak `std::io::Write`. The typed error stays
/// reachable through `io::Error::get_ref()` + `downcast_ref::<ReplaceError>()`.
impl From<ReplaceError> for io::Error {
    fn from(e: ReplaceError) -> Self {
        io::Error::new(e.io_kind(), e)
    }
}

/// True when `e` is EXDEV (rename across mount points).
pub(crate) fn is_cross_device(e: &io::Error) -> bool {
    #[cfg(unix)]
    {
        if e.raw_os_error() == Some(libc::EXDEV) {
            return true;
        }
    }
    e.kind() == io::ErrorKind::CrossesDevices
}

/// Display adapter appending a platform-aware hint and the OS code.
struct Hint<'a>(&'a io::Error);

impl fmt::Display for Hint<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = self.0;
        if let Some(code) = e.raw_os_error() {
            #[cfg(unix)]
            {
                let hint = match code {
                    libc::EACCES | libc::EPERM => {
                        Some("permission denied; check ownership and write permissions.")
                    }
                    libc::EXDEV => Some("cross-filesystem; atomic rename not possible."),
                    libc::ENOENT => Some("path not found; verify it exists."),
                    libc::ENOSPC => Some("insufficient space on device."),
                    libc::EROFS => Some("read-only filesystem; cannot write here."),
                    libc::EISDIR => Some("destination is a directory."),
                    libc::ENOTEMPTY => Some("destination is a non-empty directory."),
                    libc::ELOOP => Some("too many symbolic link levels (ELOOP); possible symlink cycle."),
                    libc::ENAMETOOLONG => Some("filename or path too long; shorten path segments."),
                    libc::EMFILE => Some("process file descriptor limit reached; close files or raise limits."),
                    libc::ENFILE => Some("system-wide file table overflow; reduce open files."),
                    _ => None,
                };
                if let Some(h) = hint {
                    write!(f, " ({h})")?;
                }
            }
            return write!(f, " [os code: {code}]");
        }
        match e.kind() {
            io::ErrorKind::PermissionDenied => {
                f.write_str(" (permission denied; check ownership and write permissions.)")
            }
            io::ErrorKind::NotFound => f.write_str(" (path not found; verify it exists.)"),
            _ => Ok(()),
        }
    }
}
