/// Error taxonomy for the sync engine.
///
/// Configuration errors are fatal and reported before any pass runs.
/// I/O errors carry the operation and path that failed; whether they abort
/// a pass is decided by the [`FailurePolicy`](crate::config::FailurePolicy).
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The filesystem operation that produced an I/O error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoOp {
    ReadDir,
    Metadata,
    CreateDir,
    Copy,
    Remove,
}

impl std::fmt::Display for IoOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IoOp::ReadDir => "read directory",
            IoOp::Metadata => "read metadata of",
            IoOp::CreateDir => "create directory",
            IoOp::Copy => "copy",
            IoOp::Remove => "remove",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    /// The source path is missing or is not a directory.
    #[error("{} is not a valid directory", .0.display())]
    InvalidSource(PathBuf),

    /// The replica path exists but is not a directory.
    #[error("replica {} exists and is not a directory", .0.display())]
    InvalidReplica(PathBuf),

    /// The interval between passes must be non-zero.
    #[error("sync interval must be at least one second")]
    InvalidInterval,

    /// Source and replica overlap, so mirroring would feed on its own output
    /// or delete the source.
    #[error("source {} and replica {} must not contain one another", source_dir.display(), replica_dir.display())]
    OverlappingTrees {
        source_dir: PathBuf,
        replica_dir: PathBuf,
    },

    /// A filesystem operation failed.
    #[error("failed to {op} {}: {error}", path.display())]
    Io {
        op: IoOp,
        path: PathBuf,
        #[source]
        error: io::Error,
    },
}

impl SyncError {
    pub(crate) fn io(op: IoOp, path: impl Into<PathBuf>, error: io::Error) -> Self {
        SyncError::Io {
            op,
            path: path.into(),
            error,
        }
    }

    /// `true` for errors that indicate misconfiguration rather than a
    /// transient filesystem fault.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, SyncError::Io { .. })
    }
}
