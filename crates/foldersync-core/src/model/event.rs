/// Sync events — one per mutating action taken on the replica.
///
/// The `Display` impl is the canonical log line; console and file
/// destinations both render events through it.
use std::fmt;
use std::path::{Path, PathBuf};

/// Discriminant of a [`SyncEvent`], handy for counting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Created,
    Copied,
    Deleted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncEvent {
    /// A missing replica entry was created. `source` is `None` for
    /// directories and the copied file for files.
    Created {
        source: Option<PathBuf>,
        replica: PathBuf,
    },
    /// A stale replica file was replaced by its newer source counterpart.
    Copied { source: PathBuf, replica: PathBuf },
    /// An orphan was removed from the replica. `source` is the source
    /// directory it was compared against; it is not rendered.
    Deleted { source: PathBuf, replica: PathBuf },
}

impl SyncEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            SyncEvent::Created { .. } => EventKind::Created,
            SyncEvent::Copied { .. } => EventKind::Copied,
            SyncEvent::Deleted { .. } => EventKind::Deleted,
        }
    }

    /// The replica path this event affected.
    pub fn replica(&self) -> &Path {
        match self {
            SyncEvent::Created { replica, .. }
            | SyncEvent::Copied { replica, .. }
            | SyncEvent::Deleted { replica, .. } => replica,
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncEvent::Created { replica, .. } => write!(f, "Created: {}", replica.display()),
            SyncEvent::Copied { source, replica } => {
                write!(f, "Copied: {} > {}", source.display(), replica.display())
            }
            SyncEvent::Deleted { replica, .. } => write!(f, "Deleted: {}", replica.display()),
        }
    }
}
