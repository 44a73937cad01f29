//! Pending replacement of a destination file.
//!
//! A `PendingReplacement` owns a temp file on the destination's filesystem.
//! Callers write the new content into it and then either `commit` (fsync,
//! fix up mode/ownership, rename over the destination) or `cleanup` (remove
//! the temp file). The destination is only ever touched by that one rename,
//! so observers see either the old or the new complete file.
//!
//! Lifecycle: `Open -> Committed` or `Open -> Cleaned`. `cleanup` is a no-op
//! after either terminal state; `write` and `commit` fail with `Closed`.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use super::atomic;
use super::temp_dir::{destination_dir, resolve_temp_dir, same_device};
use super::temp_file::create_temp_file;
use crate::config::{Environment, Options, Owner};
use crate::errors::{ReplaceError, Result};
use crate::permissions::{ModePlan, resolve_mode, resolve_owner};
use crate::platform;

/// Observable lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Open,
    Committed,
    Cleaned,
}

enum State {
    Open(File),
    Committed,
    Cleaned,
}

pub struct PendingReplacement {
    state: State,
    dest: PathBuf,
    temp_path: PathBuf,
    plan: ModePlan,
    owner: Option<Owner>,
    sync: bool,
    sync_dir: bool,
}

impl std::fmt::Debug for PendingReplacement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingReplacement")
            .field("state", &self.lifecycle())
            .field("dest", &self.dest)
            .field("temp_path", &self.temp_path)
            .field("plan", &self.plan)
            .finish()
    }
}

impl PendingReplacement {
    /// Start replacing `dest`, reading umask and TMPDIR from the process.
    pub fn new(dest: impl AsRef<Path>, opts: &Options) -> Result<Self> {
        Self::with_env(dest, opts, &Environment::from_process())
    }

    /// Start replacing `dest` with an injected environment.
    pub fn with_env(dest: impl AsRef<Path>, opts: &Options, env: &Environment) -> Result<Self> {
        let dest = dest.as_ref().to_path_buf();

        let existing_mode = if opts.wants_existing_permissions() {
            platform::existing_regular_mode(&dest)
                .map_err(|e| ReplaceError::from_io("stat destination", &dest, e))?
        } else {
            None
        };
        let plan = resolve_mode(&opts.permission_request(), env.umask, existing_mode);

        let dir = match opts.get_temp_dir() {
            Some(dir) => {
                reject_cross_device_override(dir, &dest)?;
                dir.to_path_buf()
            }
            None => resolve_temp_dir(&dest, None, env),
        };

        let prefix = match opts.get_prefix() {
            Some(p) => p.clone(),
            None => default_prefix(&dest)?,
        };

        let (file, temp_path) = create_temp_file(&dir, &prefix, plan.creation_mode)?;
        let pending = Self {
            state: State::Open(file),
            dest,
            temp_path,
            plan,
            owner: resolve_owner(opts.get_owner()),
            sync: opts.get_sync(),
            sync_dir: opts.get_sync_dir(),
        };

        // On failure `pending` is dropped, which removes the temp file.
        if let Some(mode) = plan.post_creation {
            pending.force_mode(mode)?;
        }
        debug!(
            dest = %pending.dest.display(),
            temp = %pending.temp_path.display(),
            mode = format!("{:o}", plan.effective_mode),
            source = ?plan.source,
            "pending replacement opened"
        );
        Ok(pending)
    }

    /// Shorthand for a replacement with mode exactly 0600, optionally hosting
    /// the temp file in `dir`.
    pub fn temp_file(dir: Option<&Path>, dest: impl AsRef<Path>) -> Result<Self> {
        let mut opts = Options::new().static_mode(0o600);
        if let Some(d) = dir {
            opts = opts.temp_dir(d);
        }
        Self::new(dest, &opts)
    }

    pub fn destination(&self) -> &Path {
        &self.dest
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    pub fn mode_plan(&self) -> &ModePlan {
        &self.plan
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.state {
            State::Open(_) => Lifecycle::Open,
            State::Committed => Lifecycle::Committed,
            State::Cleaned => Lifecycle::Cleaned,
        }
    }

    /// The open temp file, e.g. for `set_len` or seeking writes.
    pub fn file(&self) -> Result<&File> {
        match &self.state {
            State::Open(f) => Ok(f),
            _ => Err(self.closed()),
        }
    }

    /// Make the temp file the destination.
    ///
    /// Order: fsync (if enabled), ownership then mode fix-ups, rename, close.
    /// If any step fails the handle stays `Open` and the destination is
    /// untouched; call [`cleanup`](Self::cleanup) to drop the temp file.
    pub fn commit(&mut self) -> Result<()> {
        let file = match &self.state {
            State::Open(f) => f,
            _ => return Err(self.closed()),
        };

        if self.sync {
            file.sync_all()
                .map_err(|e| ReplaceError::from_io("fsync temp file", &self.temp_path, e))?;
        }

        if let Some(owner) = self.owner {
            platform::set_file_owner(file, owner.uid, owner.gid)
                .map_err(|e| ReplaceError::from_io("chown temp file", &self.temp_path, e))?;
            trace!(temp = %self.temp_path.display(), uid = ?owner.uid, gid = ?owner.gid, "applied ownership");
        }
        if let Some(mode) = self.plan.post_creation {
            self.force_mode(mode)?;
        }

        atomic::replace(&self.temp_path, &self.dest)?;
        // Dropping the File closes it.
        self.state = State::Committed;

        if self.sync_dir {
            atomic::sync_parent_dir(&self.dest);
        }
        debug!(dest = %self.dest.display(), temp = %self.temp_path.display(), "committed replacement");
        Ok(())
    }

    /// Remove the temp file if it was never committed. Safe to call any
    /// number of times, in any state; never touches the destination.
    pub fn cleanup(&mut self) -> Result<()> {
        if !matches!(self.state, State::Open(_)) {
            return Ok(());
        }
        match fs::remove_file(&self.temp_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(ReplaceError::from_io("remove temp file", &self.temp_path, e)),
        }
        self.state = State::Cleaned;
        trace!(temp = %self.temp_path.display(), "cleaned up temp file");
        Ok(())
    }

    /// fchmod to `mode` unless the file already has it.
    fn force_mode(&self, mode: u32) -> Result<()> {
        let file = self.file()?;
        let current = platform::file_mode(file)
            .map_err(|e| ReplaceError::from_io("stat temp file", &self.temp_path, e))?;
        if current != mode {
            platform::set_file_mode(file, mode)
                .map_err(|e| ReplaceError::from_io("chmod temp file", &self.temp_path, e))?;
        }
        Ok(())
    }

    fn closed(&self) -> ReplaceError {
        ReplaceError::Closed {
            path: self.dest.clone(),
        }
    }
}

impl Write for PendingReplacement {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &mut self.state {
            State::Open(f) => f.write(buf),
            _ => Err(self.closed().into()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.state {
            State::Open(f) => f.flush(),
            _ => Err(self.closed().into()),
        }
    }
}

impl Drop for PendingReplacement {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            warn!(temp = %self.temp_path.display(), error = %e, "failed to remove abandoned temp file");
        }
    }
}

/// "." + destination file name, so the temp file is hidden and recognisable.
fn default_prefix(dest: &Path) -> Result<OsString> {
    let name = dest.file_name().ok_or_else(|| {
        ReplaceError::from_io(
            "derive temp file name",
            dest,
            io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name"),
        )
    })?;
    let mut prefix = OsString::from(".");
    prefix.push(name);
    Ok(prefix)
}

/// A caller-supplied temp dir on another device can never be renamed
/// atomically; refuse it up front instead of failing at commit.
fn reject_cross_device_override(dir: &Path, dest: &Path) -> Result<()> {
    let dest_dir = destination_dir(dest);
    let both_known = platform::device_id(dir).is_ok() && platform::device_id(&dest_dir).is_ok();
    if both_known && !same_device(dir, &dest_dir) {
        return Err(ReplaceError::CrossDevice {
            from: dir.to_path_buf(),
            to: dest.to_path_buf(),
        });
    }
    Ok(())
}
