/// FolderSync CLI frontend.
///
/// Parses arguments, wires the event log, starts the runner and waits for
/// the stop key. All synchronisation logic lives in `foldersync-core`.
pub mod app;
pub mod args;
pub mod stop;

pub use app::{run, run_with_input};
pub use args::Cli;
