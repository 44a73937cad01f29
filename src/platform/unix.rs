//! Unix implementations of platform helpers.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::os::unix::fs::{MetadataExt, OpenOptionsExt, PermissionsExt};
use std::path::Path;

use super::MODE_MASK;

/// Filesystem device identity of `path` (st_dev).
pub fn device_id(path: &Path) -> io::Result<u64> {
    Ok(fs::metadata(path)?.dev())
}

/// Read the process umask without changing it.
///
/// Linux exposes it as the `Umask:` line of /proc/self/status (4.7+). The
/// umask(2) syscall can only be read by setting it, which would race with
/// other threads creating files, so other Unixes report `None`.
pub fn current_umask() -> Option<u32> {
    #[cfg(any(target_os = "linux", target_os = "android"))]
    {
        let status = fs::read_to_string("/proc/self/status").ok()?;
        parse_status_umask(&status)
    }
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    {
        None
    }
}

#[cfg_attr(not(any(target_os = "linux", target_os = "android")), allow(dead_code))]
fn parse_status_umask(status: &str) -> Option<u32> {
    status
        .lines()
        .find_map(|l| l.strip_prefix("Umask:"))
        .and_then(|v| u32::from_str_radix(v.trim(), 8).ok())
        .map(|m| m & 0o777)
}

/// Create `path` with O_CREAT|O_EXCL and `mode` (the kernel applies the umask).
pub fn open_exclusive(path: &Path, mode: u32) -> io::Result<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .mode(mode & MODE_MASK)
        .open(path)
}

/// Mode bits of an open file (fstat).
pub fn file_mode(file: &File) -> io::Result<u32> {
    Ok(file.metadata()?.permissions().mode() & MODE_MASK)
}

/// fchmod: applied verbatim, no umask involved.
pub fn set_file_mode(file: &File, mode: u32) -> io::Result<()> {
    file.set_permissions(fs::Permissions::from_mode(mode & MODE_MASK))
}

/// fchown; `None` leaves that id unchanged.
pub fn set_file_owner(file: &File, uid: Option<u32>, gid: Option<u32>) -> io::Result<()> {
    std::os::unix::fs::fchown(file, uid, gid)
}

/// Mode of `path` if it is an existing regular file (not following symlinks).
/// A missing path or a non-regular entry yields `None`; other stat failures
/// are returned.
pub fn existing_regular_mode(path: &Path) -> io::Result<Option<u32>> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_file() => Ok(Some(meta.permissions().mode() & MODE_MASK)),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

pub fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

/// Open log file for appending; set 0600 only when creating a new file.
/// If the file already exists, we preserve its existing permissions.
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let existed = path.exists();
    let f = OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600) // applies on create
        .open(path)?;
    if !existed {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(f)
}
