//! Config module.
//! Provides the caller-facing replacement options, the injected process
//! environment (umask, preferred scratch directory), and CLI log levels.

pub mod env;
pub mod options;
pub mod paths;
pub mod types;

pub use env::Environment;
pub use options::{Options, Owner};
pub use paths::path_has_symlink_ancestor;
pub use types::LogLevel;

/// Mode used when nothing else was requested: owner read/write only.
pub const DEFAULT_MODE: u32 = 0o600;

/// Umask assumed when the platform cannot report it without mutating it.
pub const FALLBACK_UMASK: u32 = 0o022;
