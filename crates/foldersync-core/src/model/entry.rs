/// Filesystem entries as seen by a single pass.
use std::fs::{self, Metadata};
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    /// A regular file.
    File,
    /// Pipe, socket or device node. Never copied.
    Other,
}

/// A directory or file with the metadata the reconciler needs.
#[derive(Clone, Debug)]
pub struct FileSystemEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Last-modified time. `None` if the platform cannot report it.
    pub modified: Option<SystemTime>,
}

impl FileSystemEntry {
    /// Stat a source entry. Symlinks are followed, so a link to a directory
    /// is mirrored as a directory.
    pub fn read_source(path: &Path) -> io::Result<Self> {
        fs::metadata(path).map(|meta| Self::from_metadata(path, &meta))
    }

    /// Stat a replica entry without following symlinks. Returns `Ok(None)`
    /// when nothing exists at `path`.
    pub fn read_replica(path: &Path) -> io::Result<Option<Self>> {
        match fs::symlink_metadata(path) {
            Ok(meta) => Ok(Some(Self::from_metadata(path, &meta))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn from_metadata(path: &Path, meta: &Metadata) -> Self {
        let kind = if meta.is_dir() {
            EntryKind::Dir
        } else if meta.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        Self {
            path: path.to_path_buf(),
            kind,
            modified: meta.modified().ok(),
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Whether a replica file with mtime `replica` must be refreshed from a
/// source file with mtime `source`.
///
/// Strictly greater-than: equal timestamps count as in sync. When either
/// side has no timestamp the file is left alone.
pub fn is_stale(source: Option<SystemTime>, replica: Option<SystemTime>) -> bool {
    match (source, replica) {
        (Some(s), Some(r)) => s > r,
        _ => false,
    }
}
