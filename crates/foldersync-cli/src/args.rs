/// Command-line arguments.
///
/// Positional `<source> <replica> <interval_seconds> [<log_file>]`, with bad
/// usage mapped to exit status 1.
use clap::Parser;
use foldersync_core::{FailurePolicy, SyncConfig};
use std::path::PathBuf;
use std::time::Duration;

/// Mirror a source folder into a replica folder on a fixed interval.
///
/// Every create, copy and delete is logged to the console and, if given,
/// appended to a log file. Press q then Enter to stop.
#[derive(Parser, Debug, Clone)]
#[command(name = "foldersync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder to mirror from
    pub source_folder: PathBuf,

    /// Folder to mirror into (created if missing)
    pub replica_folder: PathBuf,

    /// Seconds to wait between synchronisation passes
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    pub interval_seconds: u64,

    /// Append-only log file for sync actions
    pub log_file: Option<PathBuf>,

    /// Abort a pass on the first file error instead of skipping the entry
    #[arg(long)]
    pub abort_on_error: bool,

    /// Enable debug diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse `std::env::args`, exiting with status 1 on bad usage.
    ///
    /// `--help` and `--version` still exit with status 0.
    pub fn parse_or_exit() -> Self {
        match Self::try_parse() {
            Ok(cli) => cli,
            Err(err) => {
                let code = if err.use_stderr() { 1 } else { 0 };
                let _ = err.print();
                std::process::exit(code);
            }
        }
    }

    pub fn to_config(&self) -> SyncConfig {
        let policy = if self.abort_on_error {
            FailurePolicy::AbortPass
        } else {
            FailurePolicy::SkipEntry
        };
        SyncConfig::new(
            &self.source_folder,
            &self.replica_folder,
            Duration::from_secs(self.interval_seconds),
        )
        .with_failure_policy(policy)
    }
}
