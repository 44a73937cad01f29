//! Caller configuration for a pending replacement.
//!
//! Options layer the way callers usually think about them: a requested mode
//! that the umask may trim, a static mode that is applied verbatim, and a
//! request to carry over the mode of the file being replaced. How those
//! combine is decided by [`crate::permissions::resolve_mode`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::permissions::PermissionRequest;

/// Target ownership; `None` leaves that id unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Owner {
    pub uid: Option<u32>,
    pub gid: Option<u32>,
}

impl Owner {
    pub fn new(uid: Option<u32>, gid: Option<u32>) -> Self {
        Self { uid, gid }
    }

    pub fn is_unset(&self) -> bool {
        self.uid.is_none() && self.gid.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    temp_dir: Option<PathBuf>,
    mode: Option<u32>,
    static_mode: Option<u32>,
    existing_permissions: bool,
    ignore_umask: bool,
    owner: Owner,
    sync: bool,
    sync_dir: bool,
    prefix: Option<OsString>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            temp_dir: None,
            mode: None,
            static_mode: None,
            existing_permissions: false,
            ignore_umask: false,
            owner: Owner::default(),
            sync: true,
            sync_dir: false,
            prefix: None,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host the temp file in `dir` instead of resolving one. The directory
    /// must be on the destination's filesystem.
    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Requested mode, trimmed by the umask unless [`Options::ignore_umask`].
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Exact mode for the final file regardless of umask or existing file.
    pub fn static_mode(mut self, mode: u32) -> Self {
        self.static_mode = Some(mode);
        self
    }

    /// Reuse the mode of the destination if it is an existing regular file.
    pub fn existing_permissions(mut self) -> Self {
        self.existing_permissions = true;
        self
    }

    pub fn ignore_umask(mut self) -> Self {
        self.ignore_umask = true;
        self
    }

    pub fn owner(mut self, owner: Owner) -> Self {
        self.owner = owner;
        self
    }

    /// fsync the temp file before renaming it (default: on).
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Best-effort fsync of the destination directory after the rename.
    pub fn sync_dir(mut self, sync_dir: bool) -> Self {
        self.sync_dir = sync_dir;
        self
    }

    /// Temp file name prefix (default: "." followed by the destination name).
    pub fn prefix(mut self, prefix: impl Into<OsString>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn get_temp_dir(&self) -> Option<&Path> {
        self.temp_dir.as_deref()
    }

    pub fn get_owner(&self) -> Owner {
        self.owner
    }

    pub fn get_sync(&self) -> bool {
        self.sync
    }

    pub fn get_sync_dir(&self) -> bool {
        self.sync_dir
    }

    pub fn get_prefix(&self) -> Option<&OsString> {
        self.prefix.as_ref()
    }

    pub fn wants_existing_permissions(&self) -> bool {
        self.existing_permissions
    }

    pub(crate) fn permission_request(&self) -> PermissionRequest {
        PermissionRequest {
            static_mode: self.static_mode,
            mode: self.mode,
            use_existing: self.existing_permissions,
            apply_umask: !self.ignore_umask,
        }
    }
}
