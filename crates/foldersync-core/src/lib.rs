/// FolderSync Core — one-way tree reconciliation and the periodic runner.
///
/// This crate contains all synchronisation logic with zero CLI dependencies.
/// Frontends (the bundled CLI, tests, embedding code) drive it through
/// [`runner::start_sync`] or call [`reconcile::reconcile`] directly.
///
/// # Modules
///
/// - [`model`] — Sync events, filesystem entries and pass statistics.
/// - [`reconcile`] — The recursive source → replica tree diff.
/// - [`runner`] — Background periodic loop with cooperative cancellation.
/// - [`sink`] — Console and append-only file destinations for event lines.
/// - [`config`] — Validated runtime configuration.
pub mod config;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod runner;
pub mod sink;

pub use config::{FailurePolicy, SyncConfig};
pub use error::SyncError;
