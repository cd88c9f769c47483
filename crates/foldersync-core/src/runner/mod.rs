/// Periodic runner — repeats reconciliation passes on a background thread.
///
/// The loop is: run a pass, sleep the full interval, check the cancel
/// token, repeat. Consequences:
///
/// - at least one pass always runs;
/// - a stop requested mid-pass takes effect after that pass and its sleep;
/// - a stop requested mid-sleep takes effect when the sleep ends, with no
///   new pass started.
///
/// Cancellation is cooperative and coarse. There is no way to interrupt a
/// pass or a single I/O operation.
pub mod progress;

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::model::{EntryFailure, RunSummary, SyncEvent};
use crate::reconcile::{reconcile_pass, PassObserver};
use chrono::Local;
use crossbeam_channel::{Receiver, Sender};
use progress::RunnerProgress;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// Maximum number of progress messages that may queue up in the channel.
///
/// One message per pass plus one per skipped entry. Overflow is dropped
/// rather than blocking the runner.
pub const PROGRESS_CHANNEL_CAPACITY: usize = 1_024;

/// Shared stop flag, set once and polled by the runner at pass boundaries.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the runner to stop at its next boundary.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Handle to a runner thread started by [`start_sync`].
///
/// Dropping the handle requests a stop but does not wait for it.
pub struct SyncHandle {
    /// Receiver for progress updates from the runner thread.
    pub progress_rx: Receiver<RunnerProgress>,
    cancel: CancelToken,
    thread: Option<thread::JoinHandle<Result<RunSummary, SyncError>>>,
}

impl SyncHandle {
    /// Request the runner to stop. Non-blocking.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// A clone of the token, for handing to a stop trigger on another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Block until the runner thread exits and return its result.
    ///
    /// Panics on the runner thread are propagated to the caller.
    pub fn join(mut self) -> Result<RunSummary, SyncError> {
        match self.thread.take() {
            Some(handle) => match handle.join() {
                Ok(result) => result,
                Err(panic) => std::panic::resume_unwind(panic),
            },
            None => Ok(RunSummary::default()),
        }
    }
}

impl Drop for SyncHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Validate `config` and start the periodic loop on a background thread.
///
/// Configuration errors are returned before any thread is spawned.
pub fn start_sync<O>(config: SyncConfig, observer: O) -> Result<SyncHandle, SyncError>
where
    O: PassObserver + Send + 'static,
{
    config.validate()?;

    let (progress_tx, progress_rx) =
        crossbeam_channel::bounded::<RunnerProgress>(PROGRESS_CHANNEL_CAPACITY);
    let cancel = CancelToken::new();
    let cancel_clone = cancel.clone();

    let thread = thread::Builder::new()
        .name("foldersync-runner".into())
        .spawn(move || {
            let mut observer = observer;
            let result = run_loop(&config, &cancel_clone, &mut observer, Some(&progress_tx));
            if let Err(err) = &result {
                let _ = progress_tx.try_send(RunnerProgress::Failed {
                    message: err.to_string(),
                });
            }
            result
        })
        .expect("failed to spawn runner thread");

    Ok(SyncHandle {
        progress_rx,
        cancel,
        thread: Some(thread),
    })
}

/// Run the periodic loop on the calling thread until `cancel` is observed.
pub fn run_periodic(
    config: &SyncConfig,
    cancel: &CancelToken,
    observer: &mut dyn PassObserver,
) -> Result<RunSummary, SyncError> {
    config.validate()?;
    run_loop(config, cancel, observer, None)
}

fn run_loop(
    config: &SyncConfig,
    cancel: &CancelToken,
    observer: &mut dyn PassObserver,
    progress_tx: Option<&Sender<RunnerProgress>>,
) -> Result<RunSummary, SyncError> {
    info!(
        "Mirroring {} into {} every {:?}",
        config.source.display(),
        config.replica.display(),
        config.interval
    );

    let mut run = RunSummary::default();
    let mut pass: u64 = 0;

    loop {
        pass += 1;
        let at = Local::now();
        debug!("Pass {pass} started at {}", at.format("%H:%M:%S"));
        send(progress_tx, RunnerProgress::PassStarted { pass, at });

        let mut forwarding = ForwardFailures {
            inner: &mut *observer,
            progress_tx,
        };
        let summary = match reconcile_pass(
            pass,
            &config.source,
            &config.replica,
            config.failure_policy,
            &mut forwarding,
        ) {
            Ok(summary) => summary,
            Err(err) => {
                warn!("Pass {pass} aborted: {err}");
                return Err(err);
            }
        };

        if summary.is_noop() {
            debug!("{summary}");
        } else {
            info!("{summary}");
        }
        run.absorb(&summary);
        send(progress_tx, RunnerProgress::PassComplete(summary));

        thread::sleep(config.interval);

        if cancel.is_cancelled() {
            break;
        }
    }

    info!("Synchronisation stopped: {run}");
    send(progress_tx, RunnerProgress::Stopped(run.clone()));
    Ok(run)
}

fn send(tx: Option<&Sender<RunnerProgress>>, msg: RunnerProgress) {
    if let Some(tx) = tx {
        let _ = tx.try_send(msg);
    }
}

/// Observer adapter that also publishes skipped entries on the progress channel.
struct ForwardFailures<'a> {
    inner: &'a mut dyn PassObserver,
    progress_tx: Option<&'a Sender<RunnerProgress>>,
}

impl PassObserver for ForwardFailures<'_> {
    fn on_event(&mut self, event: &SyncEvent) {
        self.inner.on_event(event);
    }

    fn on_failure(&mut self, failure: &EntryFailure) {
        self.inner.on_failure(failure);
        send(self.progress_tx, RunnerProgress::EntryFailed(failure.clone()));
    }
}
