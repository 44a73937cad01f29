//! Filesystem operations: temp placement, temp creation, the pending
//! replacement handle and the final rename.

mod atomic;
mod cache;
mod pending;
mod temp_dir;
mod temp_file;
mod write;

pub use atomic::{replace, sync_parent_dir};
pub use cache::TempDirCache;
pub use pending::{Lifecycle, PendingReplacement};
pub use temp_dir::{destination_dir, resolve_temp_dir, temp_dir};
pub use temp_file::{MAX_ATTEMPTS, create_temp_file};
pub use write::{symlink, write_file};
