/// Pass and run statistics.
///
/// Counters only — no event is retained. The runner publishes a
/// [`PassSummary`] after every pass and folds it into a [`RunSummary`].
use crate::error::IoOp;
use crate::model::event::{EventKind, SyncEvent};
use chrono::{DateTime, Local};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A single entry that could not be synchronised during a pass.
#[derive(Clone, Debug)]
pub struct EntryFailure {
    pub op: IoOp,
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to {} {}: {}", self.op, self.path.display(), self.message)
    }
}

/// Statistics for one reconciliation pass.
#[derive(Clone, Debug)]
pub struct PassSummary {
    /// 1-based pass number within the run (0 for standalone passes).
    pub pass: u64,
    pub started_at: DateTime<Local>,
    pub duration: Duration,
    pub created: u64,
    pub copied: u64,
    pub deleted: u64,
    pub failed: u64,
    /// Bytes written to the replica by `Created` and `Copied` file events.
    pub bytes_copied: u64,
}

impl PassSummary {
    pub fn new(pass: u64) -> Self {
        Self {
            pass,
            started_at: Local::now(),
            duration: Duration::ZERO,
            created: 0,
            copied: 0,
            deleted: 0,
            failed: 0,
            bytes_copied: 0,
        }
    }

    pub(crate) fn record_event(&mut self, event: &SyncEvent, bytes: u64) {
        match event.kind() {
            EventKind::Created => self.created += 1,
            EventKind::Copied => self.copied += 1,
            EventKind::Deleted => self.deleted += 1,
        }
        self.bytes_copied += bytes;
    }

    pub(crate) fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Number of mutating actions taken on the replica.
    pub fn changes(&self) -> u64 {
        self.created + self.copied + self.deleted
    }

    /// `true` when the pass found the replica already in sync.
    pub fn is_noop(&self) -> bool {
        self.changes() == 0 && self.failed == 0
    }
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pass {} ({}): {} created, {} copied, {} deleted, {} failed, {} written in {:?}",
            self.pass,
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            self.created,
            self.copied,
            self.deleted,
            self.failed,
            format_bytes(self.bytes_copied),
            self.duration,
        )
    }
}

/// Totals across every pass of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub passes: u64,
    pub created: u64,
    pub copied: u64,
    pub deleted: u64,
    pub failed: u64,
    pub bytes_copied: u64,
}

impl RunSummary {
    pub fn absorb(&mut self, pass: &PassSummary) {
        self.passes += 1;
        self.created += pass.created;
        self.copied += pass.copied;
        self.deleted += pass.deleted;
        self.failed += pass.failed;
        self.bytes_copied += pass.bytes_copied;
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passes: {} created, {} copied, {} deleted, {} failed, {} written",
            self.passes,
            self.created,
            self.copied,
            self.deleted,
            self.failed,
            format_bytes(self.bytes_copied),
        )
    }
}

/// Human-readable byte count using binary units.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
