//! Per-device memo of temp directory resolutions.
//!
//! Destinations on the same device share a temp directory, so callers that
//! replace many files avoid re-probing the filesystem for each one.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::trace;

use super::temp_dir::{destination_dir, resolve_temp_dir};
use crate::config::Environment;
use crate::platform;

/// Device id -> temp directory. Entries are never invalidated.
#[derive(Debug)]
pub struct TempDirCache {
    env: Environment,
    cache: Mutex<HashMap<u64, PathBuf>>,
}

impl Default for TempDirCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TempDirCache {
    pub fn new() -> Self {
        Self::with_env(Environment::from_process())
    }

    pub fn with_env(env: Environment) -> Self {
        Self {
            env,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Cached equivalent of [`super::temp_dir`]. When the destination's
    /// device cannot be determined the answer is computed but not stored.
    pub fn get(&self, dest: impl AsRef<Path>) -> PathBuf {
        let dest = dest.as_ref();
        let dev = platform::device_id(&destination_dir(dest)).ok();

        if let Some(dev) = dev
            && let Some(hit) = self.lock().get(&dev)
        {
            trace!(dest = %dest.display(), dev, dir = %hit.display(), "temp dir cache hit");
            return hit.clone();
        }

        // Resolve without holding the lock; the first insert for a device wins.
        let resolved = resolve_temp_dir(dest, None, &self.env);
        match dev {
            Some(dev) => self.lock().entry(dev).or_insert(resolved).clone(),
            None => resolved,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u64, PathBuf>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
