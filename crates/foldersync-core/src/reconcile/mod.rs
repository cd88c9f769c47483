/// Tree reconciler — makes a replica directory mirror a source directory.
///
/// The walk is source-driven and recursive. At each directory level:
///
/// 1. The replica directory is created if missing.
/// 2. Every source child is handled: directories recurse, files are copied
///    when missing from the replica or when the source mtime is strictly
///    newer than the replica's.
/// 3. Every replica child with no same-named source child is removed
///    (recursively for directories).
///
/// Step 3 strictly follows step 2 at each level, so a rename in the source
/// shows up as a `Deleted` + `Created` pair. There is no rename detection.
///
/// Every mutating action is reported to a [`PassObserver`] the moment it
/// completes; the reconciler keeps nothing but counters.
mod ops;

use crate::config::{ensure_replica_root, ensure_source_dir, FailurePolicy};
use crate::error::{IoOp, SyncError};
use crate::model::{is_stale, EntryFailure, EntryKind, FileSystemEntry, PassSummary, SyncEvent};
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};

/// Receives the outcome of each mutating action during a pass.
pub trait PassObserver {
    /// Called once per create/copy/delete, after it succeeded.
    fn on_event(&mut self, event: &SyncEvent);

    /// Called once per entry skipped under [`FailurePolicy::SkipEntry`].
    fn on_failure(&mut self, _failure: &EntryFailure) {}
}

impl PassObserver for Vec<SyncEvent> {
    fn on_event(&mut self, event: &SyncEvent) {
        self.push(event.clone());
    }
}

impl<O: PassObserver + ?Sized> PassObserver for &mut O {
    fn on_event(&mut self, event: &SyncEvent) {
        (**self).on_event(event);
    }

    fn on_failure(&mut self, failure: &EntryFailure) {
        (**self).on_failure(failure);
    }
}

/// Run one standalone pass of `source` into `replica`.
///
/// Fails immediately with [`SyncError::InvalidSource`] if `source` is not an
/// existing directory, and with [`SyncError::InvalidReplica`] if a
/// non-directory already stands at `replica`. Other errors surface only under
/// [`FailurePolicy::AbortPass`].
pub fn reconcile(
    source: &Path,
    replica: &Path,
    policy: FailurePolicy,
    observer: &mut dyn PassObserver,
) -> Result<PassSummary, SyncError> {
    reconcile_pass(0, source, replica, policy, observer)
}

/// Run one pass with the default policy and return its events in order.
pub fn reconcile_collect(source: &Path, replica: &Path) -> Result<Vec<SyncEvent>, SyncError> {
    let mut events: Vec<SyncEvent> = Vec::new();
    reconcile(source, replica, FailurePolicy::default(), &mut events)?;
    Ok(events)
}

pub(crate) fn reconcile_pass(
    pass: u64,
    source: &Path,
    replica: &Path,
    policy: FailurePolicy,
    observer: &mut dyn PassObserver,
) -> Result<PassSummary, SyncError> {
    ensure_source_dir(source)?;
    ensure_replica_root(replica)?;

    let start = Instant::now();
    let mut walk = TreeWalk {
        policy,
        observer,
        summary: PassSummary::new(pass),
        ancestors: Vec::new(),
    };
    walk.sync_dir(source, replica, true)?;

    let mut summary = walk.summary;
    summary.duration = start.elapsed();
    Ok(summary)
}

/// State for one recursive walk.
struct TreeWalk<'a> {
    policy: FailurePolicy,
    observer: &'a mut dyn PassObserver,
    summary: PassSummary,
    /// Canonical source directories on the current recursion path, used to
    /// refuse symlink cycles.
    ancestors: Vec<PathBuf>,
}

impl TreeWalk<'_> {
    fn sync_dir(&mut self, source: &Path, replica: &Path, is_root: bool) -> Result<(), SyncError> {
        let canonical = source
            .canonicalize()
            .map_err(|e| SyncError::io(IoOp::Metadata, source, e));
        let Some(canonical) = self.attempt(canonical)? else {
            return Ok(());
        };
        if self.ancestors.contains(&canonical) {
            warn!(
                "Skipping {}: symlink cycle back to {}",
                source.display(),
                canonical.display()
            );
            return Ok(());
        }

        self.ancestors.push(canonical);
        let result = self.sync_dir_contents(source, replica, is_root);
        self.ancestors.pop();
        result
    }

    fn sync_dir_contents(
        &mut self,
        source: &Path,
        replica: &Path,
        is_root: bool,
    ) -> Result<(), SyncError> {
        // A root replica that is a symlink to a directory is used as-is;
        // below the root, links in the replica are replaced, never followed.
        if !(is_root && replica.is_dir()) && !self.ensure_replica_dir(source, replica)? {
            return Ok(());
        }

        let Some(children) = self.attempt(ops::list_dir(source))? else {
            return Ok(());
        };

        let mut source_names: HashSet<OsString> = HashSet::with_capacity(children.len());
        let mut listing_complete = true;
        for child in children {
            let Some((name, path, _)) = self.attempt(child)? else {
                listing_complete = false;
                continue;
            };
            let dest = replica.join(&name);
            source_names.insert(name);

            let read = FileSystemEntry::read_source(&path)
                .map_err(|e| SyncError::io(IoOp::Metadata, &path, e));
            let Some(entry) = self.attempt(read)? else {
                continue;
            };

            match entry.kind {
                EntryKind::Dir => self.sync_dir(&path, &dest, false)?,
                EntryKind::File => self.sync_file(source, &entry, &dest)?,
                // Opening a FIFO for reading blocks until a writer appears.
                EntryKind::Other => warn!("Skipping {}: not a regular file", path.display()),
            }
        }

        // An unnamed failed child could match any replica entry.
        if !listing_complete {
            return Ok(());
        }
        self.remove_orphans(source, replica, &source_names)
    }

    /// Step 1. Returns `false` if the replica directory could not be put in
    /// place, in which case the subtree is skipped for this pass.
    fn ensure_replica_dir(&mut self, source: &Path, replica: &Path) -> Result<bool, SyncError> {
        let existing = FileSystemEntry::read_replica(replica)
            .map_err(|e| SyncError::io(IoOp::Metadata, replica, e));
        let Some(existing) = self.attempt(existing)? else {
            return Ok(false);
        };

        match existing {
            Some(entry) if entry.is_dir() => return Ok(true),
            Some(_) => {
                // A file stands where the source has a directory.
                if self.attempt(ops::remove_entry(replica, false))?.is_none() {
                    return Ok(false);
                }
                self.emit(
                    SyncEvent::Deleted {
                        source: source.to_path_buf(),
                        replica: replica.to_path_buf(),
                    },
                    0,
                );
            }
            None => {}
        }

        if self.attempt(ops::create_dir(replica))?.is_none() {
            return Ok(false);
        }
        self.emit(
            SyncEvent::Created {
                source: None,
                replica: replica.to_path_buf(),
            },
            0,
        );
        Ok(true)
    }

    fn sync_file(
        &mut self,
        source_dir: &Path,
        entry: &FileSystemEntry,
        dest: &Path,
    ) -> Result<(), SyncError> {
        let existing = FileSystemEntry::read_replica(dest)
            .map_err(|e| SyncError::io(IoOp::Metadata, dest, e));
        let Some(existing) = self.attempt(existing)? else {
            return Ok(());
        };

        match existing {
            None => self.copy_new(entry, dest),
            Some(current) if current.is_dir() => {
                // A directory stands where the source has a file.
                if self.attempt(ops::remove_entry(dest, true))?.is_none() {
                    return Ok(());
                }
                self.emit(
                    SyncEvent::Deleted {
                        source: source_dir.to_path_buf(),
                        replica: dest.to_path_buf(),
                    },
                    0,
                );
                self.copy_new(entry, dest)
            }
            Some(current) => {
                if !is_stale(entry.modified, current.modified) {
                    return Ok(());
                }
                if self.attempt(ops::remove_entry(dest, false))?.is_none() {
                    return Ok(());
                }
                let Some(bytes) = self.attempt(ops::copy_file(&entry.path, dest))? else {
                    return Ok(());
                };
                self.emit(
                    SyncEvent::Copied {
                        source: entry.path.clone(),
                        replica: dest.to_path_buf(),
                    },
                    bytes,
                );
                Ok(())
            }
        }
    }

    fn copy_new(&mut self, entry: &FileSystemEntry, dest: &Path) -> Result<(), SyncError> {
        let Some(bytes) = self.attempt(ops::copy_file(&entry.path, dest))? else {
            return Ok(());
        };
        self.emit(
            SyncEvent::Created {
                source: Some(entry.path.clone()),
                replica: dest.to_path_buf(),
            },
            bytes,
        );
        Ok(())
    }

    /// Step 3.
    fn remove_orphans(
        &mut self,
        source: &Path,
        replica: &Path,
        source_names: &HashSet<OsString>,
    ) -> Result<(), SyncError> {
        let Some(children) = self.attempt(ops::list_dir(replica))? else {
            return Ok(());
        };

        for child in children {
            let Some((name, path, is_dir)) = self.attempt(child)? else {
                continue;
            };
            if source_names.contains(&name) {
                continue;
            }
            if self.attempt(ops::remove_entry(&path, is_dir))?.is_none() {
                continue;
            }
            self.emit(
                SyncEvent::Deleted {
                    source: source.to_path_buf(),
                    replica: path,
                },
                0,
            );
        }
        Ok(())
    }

    fn emit(&mut self, event: SyncEvent, bytes: u64) {
        debug!("{event}");
        self.summary.record_event(&event, bytes);
        self.observer.on_event(&event);
    }

    /// Apply the failure policy to the result of one entry operation.
    ///
    /// `Ok(Some(v))` on success, `Ok(None)` when the failure was recorded and
    /// the entry should be skipped, `Err` when the pass must abort.
    fn attempt<T>(&mut self, result: Result<T, SyncError>) -> Result<Option<T>, SyncError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err) if self.policy == FailurePolicy::AbortPass => Err(err),
            Err(SyncError::Io { op, path, error }) => {
                let failure = EntryFailure {
                    op,
                    path,
                    message: error.to_string(),
                };
                warn!("{failure}; skipping until next pass");
                self.summary.record_failure();
                self.observer.on_failure(&failure);
                Ok(None)
            }
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventKind;
    use std::fs;
    use tempfile::TempDir;

    fn kinds(events: &[SyncEvent]) -> Vec<EventKind> {
        events.iter().map(SyncEvent::kind).collect()
    }

    #[test]
    fn empty_source_creates_empty_replica() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        let replica = tmp.path().join("replica");
        fs::create_dir(&source).unwrap();

        let events = reconcile_collect(&source, &replica).unwrap();

        assert_eq!(
            events,
            vec![SyncEvent::Created {
                source: None,
                replica: replica.clone()
            }]
        );
        assert!(replica.is_dir());
        assert_eq!(fs::read_dir(&replica).unwrap().count(), 0);
    }

    #[test]
    fn missing_source_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = reconcile_collect(&tmp.path().join("nope"), &tmp.path().join("r")).unwrap_err();
        assert!(matches!(err, SyncError::InvalidSource(_)));
        assert!(!tmp.path().join("r").exists());
    }

    #[test]
    fn replica_file_replaced_by_directory() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        let replica = tmp.path().join("replica");
        fs::create_dir_all(source.join("sub")).unwrap();
        fs::create_dir(&replica).unwrap();
        fs::write(replica.join("sub"), b"not a dir").unwrap();

        let events = reconcile_collect(&source, &replica).unwrap();

        assert_eq!(kinds(&events), vec![EventKind::Deleted, EventKind::Created]);
        assert!(replica.join("sub").is_dir());
    }

    #[test]
    fn replica_dir_replaced_by_file() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        let replica = tmp.path().join("replica");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("item"), b"file").unwrap();
        fs::create_dir_all(replica.join("item/deep")).unwrap();

        let events = reconcile_collect(&source, &replica).unwrap();

        assert_eq!(kinds(&events), vec![EventKind::Deleted, EventKind::Created]);
        assert_eq!(fs::read(replica.join("item")).unwrap(), b"file");
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycle_is_not_followed() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        let replica = tmp.path().join("replica");
        fs::create_dir_all(source.join("inner")).unwrap();
        std::os::unix::fs::symlink(&source, source.join("inner/loop")).unwrap();

        let events = reconcile_collect(&source, &replica).unwrap();

        assert_eq!(kinds(&events), vec![EventKind::Created, EventKind::Created]);
        assert!(replica.join("inner").is_dir());
        assert!(!replica.join("inner/loop").exists());
    }

    #[test]
    fn summary_counts_bytes_written() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("src");
        fs::create_dir(&source).unwrap();
        fs::write(source.join("a.bin"), [7u8; 300]).unwrap();

        let mut events: Vec<SyncEvent> = Vec::new();
        let summary = reconcile(
            &source,
            &tmp.path().join("replica"),
            FailurePolicy::SkipEntry,
            &mut events,
        )
        .unwrap();

        assert_eq!(summary.created, 2);
        assert_eq!(summary.bytes_copied, 300);
        assert_eq!(summary.pass, 0);
        assert_eq!(events.len(), 2);
    }
}
