/// Mutating filesystem primitives used by the reconciler.
///
/// Each wraps one `std::fs` call and tags failures with the operation and
/// path so the caller can decide whether to skip or abort.
use crate::error::{IoOp, SyncError};
use std::fs;
use std::path::{Path, PathBuf};

pub(crate) fn create_dir(path: &Path) -> Result<(), SyncError> {
    fs::create_dir(path).map_err(|e| SyncError::io(IoOp::CreateDir, path, e))
}

/// Copy file content. Returns the number of bytes written.
pub(crate) fn copy_file(from: &Path, to: &Path) -> Result<u64, SyncError> {
    fs::copy(from, to).map_err(|e| SyncError::io(IoOp::Copy, from, e))
}

/// Remove a replica entry, recursing into directories.
pub(crate) fn remove_entry(path: &Path, is_dir: bool) -> Result<(), SyncError> {
    let result = if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    result.map_err(|e| SyncError::io(IoOp::Remove, path, e))
}

/// List the immediate children of `dir` as `(name, full path, is_dir)`.
///
/// `is_dir` comes from the directory entry itself and does not follow
/// symlinks. Entries that fail to read are returned as errors in place so
/// one unreadable child does not hide its siblings.
pub(crate) fn list_dir(
    dir: &Path,
) -> Result<Vec<Result<(std::ffi::OsString, PathBuf, bool), SyncError>>, SyncError> {
    let read = fs::read_dir(dir).map_err(|e| SyncError::io(IoOp::ReadDir, dir, e))?;
    Ok(read
        .map(|entry| {
            let entry = entry.map_err(|e| SyncError::io(IoOp::ReadDir, dir, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| SyncError::io(IoOp::Metadata, entry.path(), e))?
                .is_dir();
            Ok((entry.file_name(), entry.path(), is_dir))
        })
        .collect())
}
