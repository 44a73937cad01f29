//! Process-wide inputs, captured explicitly.
//!
//! The umask and the preferred scratch directory are global process state.
//! Resolution code takes them through `Environment` so tests can inject
//! values instead of mutating the real process.

use std::path::PathBuf;
use tracing::warn;

use super::FALLBACK_UMASK;
use crate::platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Active file-creation mask (permission bits only).
    pub umask: u32,
    /// Preferred directory for temp files (TMPDIR); used only when it shares a
    /// device with the destination.
    pub preferred_temp_dir: Option<PathBuf>,
}

impl Environment {
    pub fn new(umask: u32, preferred_temp_dir: Option<PathBuf>) -> Self {
        Self {
            umask: umask & 0o777,
            preferred_temp_dir,
        }
    }

    /// Snapshot of the running process. Never changes the umask.
    pub fn from_process() -> Self {
        let umask = platform::current_umask().unwrap_or_else(|| {
            warn!(
                assumed = format!("{:o}", FALLBACK_UMASK),
                "cannot read process umask without changing it; assuming the conventional value"
            );
            FALLBACK_UMASK
        });
        // temp_dir() honours TMPDIR and falls back to /tmp.
        Self::new(umask, Some(std::env::temp_dir()))
    }

    pub fn with_preferred_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.preferred_temp_dir = dir;
        self
    }
}
