/// Runtime configuration for a sync session.
///
/// Built by the frontend from command-line arguments and validated once
/// before the first pass. Validation failures are configuration errors:
/// the session never starts.
use crate::error::SyncError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What to do when a single entry cannot be created, copied or removed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Report the failure, skip the entry and continue with its siblings.
    /// The next scheduled pass retries it.
    #[default]
    SkipEntry,
    /// Abort the pass on the first failure and surface it as an error.
    AbortPass,
}

/// A validated-on-demand description of one mirroring session.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    /// Authoritative tree. Must exist and be a directory.
    pub source: PathBuf,
    /// Mirror target. Created on the first pass if missing.
    pub replica: PathBuf,
    /// Wall-clock pause between the end of one pass and the next stop check.
    pub interval: Duration,
    pub failure_policy: FailurePolicy,
}

impl SyncConfig {
    pub fn new(source: impl Into<PathBuf>, replica: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            interval,
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Check every precondition that does not depend on a pass running.
    pub fn validate(&self) -> Result<(), SyncError> {
        ensure_source_dir(&self.source)?;
        ensure_replica_root(&self.replica)?;

        if self.interval.is_zero() {
            return Err(SyncError::InvalidInterval);
        }

        let source = resolve_lenient(&self.source);
        let replica = resolve_lenient(&self.replica);
        if replica.starts_with(&source) || source.starts_with(&replica) {
            return Err(SyncError::OverlappingTrees {
                source_dir: self.source.clone(),
                replica_dir: self.replica.clone(),
            });
        }

        Ok(())
    }
}

/// Fail with [`SyncError::InvalidSource`] unless `path` is an existing directory.
pub fn ensure_source_dir(path: &Path) -> Result<(), SyncError> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(SyncError::InvalidSource(path.to_path_buf()))
    }
}

/// Fail with [`SyncError::InvalidReplica`] if something other than a
/// directory (or a link to one) already stands at the replica root.
///
/// Below the root a mismatched entry is replaced; at the root it is far more
/// likely a mistyped argument naming a user's file.
pub fn ensure_replica_root(path: &Path) -> Result<(), SyncError> {
    let exists = std::fs::symlink_metadata(path).is_ok();
    if exists && !path.is_dir() {
        Err(SyncError::InvalidReplica(path.to_path_buf()))
    } else {
        Ok(())
    }
}

/// Canonicalise the longest existing prefix of `path` and re-append the rest.
///
/// The replica usually does not exist yet, so plain `canonicalize` would fail.
fn resolve_lenient(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    let mut existing = absolute.as_path();
    let mut tail = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return tail
                .iter()
                .rev()
                .fold(canonical, |acc: PathBuf, part| acc.join(part));
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => return absolute,
        }
    }
}
