//! Non-Unix targets: no POSIX modes, ownership or guaranteed atomic
//! replace-by-rename. Every primitive reports `Unsupported`.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

fn unsupported(op: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        format!("{op}: atomic replacement requires a Unix platform"),
    )
}

pub fn device_id(_path: &Path) -> io::Result<u64> {
    Err(unsupported("device identity"))
}

pub fn current_umask() -> Option<u32> {
    None
}

pub fn open_exclusive(_path: &Path, _mode: u32) -> io::Result<File> {
    Err(unsupported("create temp file"))
}

pub fn file_mode(_file: &File) -> io::Result<u32> {
    Err(unsupported("read file mode"))
}

pub fn set_file_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Err(unsupported("set file mode"))
}

pub fn set_file_owner(_file: &File, _uid: Option<u32>, _gid: Option<u32>) -> io::Result<()> {
    Err(unsupported("set file owner"))
}

pub fn existing_regular_mode(_path: &Path) -> io::Result<Option<u32>> {
    Err(unsupported("read destination mode"))
}

pub fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(unsupported("create symlink"))
}

/// Log files still work here; they do not need atomic replacement.
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}
