/// Application flow: validate, start the runner, wait for the stop key,
/// join the runner.
///
/// The foreground thread multiplexes runner progress and the quit signal;
/// it never touches the filesystem itself.
use crate::args::Cli;
use crate::stop::spawn_quit_watcher;
use anyhow::Context;
use crossbeam_channel::{never, select, Receiver};
use foldersync_core::model::RunSummary;
use foldersync_core::runner::progress::RunnerProgress;
use foldersync_core::runner::{start_sync, SyncHandle};
use foldersync_core::sink::EventLog;
use std::io::{self, Read};
use tracing::{debug, info, warn};

/// Run until `q` is read from standard input.
pub fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    run_with_input(cli, io::stdin())
}

/// Run until the quit key is read from `input`.
pub fn run_with_input<R>(cli: &Cli, input: R) -> anyhow::Result<RunSummary>
where
    R: Read + Send + 'static,
{
    let config = cli.to_config();
    config.validate().context("invalid configuration")?;

    let log_file = cli.log_file.as_deref();
    let log = EventLog::console_and_file(log_file).with_context(|| {
        let path = log_file.map(|p| p.display().to_string());
        format!("failed to open log file {}", path.unwrap_or_default())
    })?;

    println!("Press q to stop synchronization");

    let handle = start_sync(config, log)?;
    let quit_rx = spawn_quit_watcher(input);
    supervise(&handle, &quit_rx);

    handle.join().map_err(|err| {
        let reason = if err.is_configuration() {
            "synchronization stopped: the folders are no longer usable"
        } else {
            "synchronization aborted"
        };
        anyhow::Error::new(err).context(reason)
    })
}

/// Pump runner progress until the runner thread exits, forwarding the
/// quit signal as a stop request.
fn supervise(handle: &SyncHandle, quit_rx: &Receiver<()>) {
    let closed = never::<()>();
    let mut quit_open = true;

    loop {
        let quit = if quit_open { quit_rx } else { &closed };
        select! {
            recv(handle.progress_rx) -> msg => match msg {
                Ok(RunnerProgress::PassComplete(summary)) if summary.failed > 0 => {
                    warn!(
                        "Pass {} skipped {} entries; they will be retried next pass",
                        summary.pass, summary.failed
                    );
                }
                Ok(RunnerProgress::Failed { message }) => debug!("Runner failed: {message}"),
                Ok(_) => {}
                // The runner thread has exited.
                Err(_) => return,
            },
            recv(quit) -> msg => match msg {
                Ok(()) => {
                    info!("Stop requested; finishing the current cycle");
                    handle.stop();
                }
                Err(_) => quit_open = false,
            },
        }
    }
}
