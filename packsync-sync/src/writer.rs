//! Whole-file atomic replacement.
//!
//! ## `replace_atomic` protocol
//!
//! 1. Write the new bytes to `<path>.packsync.tmp` (same directory, so the
//!    rename never crosses a filesystem).
//! 2. `fsync` the temporary file.
//! 3. Rename over the final path (atomic on POSIX; best-effort elsewhere).
//! 4. On rename failure, remove the temporary file. The original is intact.
//! 5. On unix, `fsync` the parent directory so the rename itself survives a
//!    crash.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{io_err, SyncError};

/// Suffix appended to the target path for the in-flight temporary file.
pub const TMP_SUFFIX: &str = ".packsync.tmp";

/// Temporary sibling used while replacing `path`.
pub fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

/// Replace the file at `path` with `bytes`, never leaving a partial file
/// at `path`.
pub fn replace_atomic(path: &Path, bytes: &[u8]) -> Result<(), SyncError> {
    replace_atomic_with_tmp(path, bytes, &tmp_path_for(path))
}

pub(crate) fn replace_atomic_with_tmp(
    path: &Path,
    bytes: &[u8],
    tmp: &Path,
) -> Result<(), SyncError> {
    if let Err(e) = write_synced(tmp, bytes) {
        let _ = std::fs::remove_file(tmp);
        return Err(e);
    }

    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    sync_parent_dir(path)
}

/// Flush the directory entry for `path` to stable storage.
#[cfg(unix)]
pub(crate) fn sync_parent_dir(path: &Path) -> Result<(), SyncError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    File::open(parent)
        .and_then(|dir| dir.sync_all())
        .map_err(|e| io_err(parent, e))
}

#[cfg(not(unix))]
pub(crate) fn sync_parent_dir(_path: &Path) -> Result<(), SyncError> {
    Ok(())
}

/// Write `bytes` to `path` and flush them to stable storage.
pub(crate) fn write_synced(path: &Path, bytes: &[u8]) -> Result<(), SyncError> {
    let mut file = File::create(path).map_err(|e| io_err(path, e))?;
    file.write_all(bytes).map_err(|e| io_err(path, e))?;
    file.sync_all().map_err(|e| io_err(path, e))?;
    Ok(())
}
