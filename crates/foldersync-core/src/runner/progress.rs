/// Runner progress reporting — lightweight messages sent from the runner
/// thread to whoever holds the [`SyncHandle`](super::SyncHandle).
///
/// Messages are sent with `try_send`; if nobody drains the channel the
/// oldest state simply stops being reported and the runner carries on.
use crate::model::{EntryFailure, PassSummary, RunSummary};
use chrono::{DateTime, Local};

#[derive(Debug)]
pub enum RunnerProgress {
    /// A pass is about to start.
    PassStarted { pass: u64, at: DateTime<Local> },
    /// An entry was skipped during the current pass.
    EntryFailed(EntryFailure),
    /// A pass finished (possibly with skipped entries).
    PassComplete(PassSummary),
    /// The stop request was observed; no further passes will run.
    Stopped(RunSummary),
    /// The runner hit a fatal error and exited.
    Failed { message: String },
}
