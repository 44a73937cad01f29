//! Platform-specific helpers.
//! This module hides OS differences behind a uniform API so the rest of the
//! codebase can remain platform-agnostic. Atomic replacement needs POSIX
//! rename and mode semantics; other targets get `Unsupported` errors instead
//! of a silently weaker implementation.

#[cfg(not(unix))]
mod other;
pub(crate) mod temp;
#[cfg(unix)]
mod unix;

#[cfg(not(unix))]
pub use other::{
    current_umask, device_id, existing_regular_mode, file_mode, open_exclusive,
    open_log_file_secure_append, set_file_mode, set_file_owner, symlink,
};
#[cfg(unix)]
pub use unix::{
    current_umask, device_id, existing_regular_mode, file_mode, open_exclusive,
    open_log_file_secure_append, set_file_mode, set_file_owner, symlink,
};

/// Mask applied to every mode we read or write: permission bits plus
/// setuid/setgid/sticky.
pub const MODE_MASK: u32 = 0o7777;
