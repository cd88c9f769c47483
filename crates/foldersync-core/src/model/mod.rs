/// Data model for a sync pass.
///
/// Everything here is ephemeral: entries are read fresh from the filesystem
/// on every pass and events are handed to the observer as soon as they occur.
pub mod entry;
pub mod event;
pub mod summary;

pub use entry::{is_stale, EntryKind, FileSystemEntry};
pub use event::{EventKind, SyncEvent};
pub use summary::{EntryFailure, PassSummary, RunSummary};
