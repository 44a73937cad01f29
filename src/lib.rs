//! Core library for `atomic_replace`.
//!
//! Create or replace a file so that readers observe either the old content or
//! the complete new content, never a mix. New content goes into a temp file on
//! the destination's filesystem, which is fsync'ed, given its final mode and
//! owner, and renamed over the destination.
//!
//! ```no_run
//! use std::io::Write;
//! use atomic_replace::{Options, PendingReplacement};
//!
//! # fn main() -> std::io::Result<()> {
//! let mut pf = PendingReplacement::new("/srv/www/metrics.txt", &Options::new().mode(0o644))?;
//! pf.write_all(b"temperature_degc 31.2\n")?;
//! pf.commit()?;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod permissions;
pub mod platform;

pub use config::{Environment, LogLevel, Options, Owner, path_has_symlink_ancestor};
pub use errors::{ReplaceError, Result};
pub use fs_ops::{
    Lifecycle, MAX_ATTEMPTS, PendingReplacement, TempDirCache, resolve_temp_dir, symlink, temp_dir,
    write_file,
};
pub use permissions::{ModePlan, ModeSource, PermissionRequest, resolve_mode};

/// Convenience prelude for common imports.
pub mod prelude {
    pub use crate::config::{Environment, LogLevel, Options, Owner};
    pub use crate::errors::{ReplaceError, Result as ARResult};
    pub use crate::fs_ops::{
        Lifecycle, PendingReplacement, TempDirCache, resolve_temp_dir, symlink, temp_dir, write_file,
    };
}
