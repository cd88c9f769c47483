//! FolderSync — one-way periodic folder mirroring.
//!
//! Thin binary entry point. All logic lives in the `foldersync-core`
//! and `foldersync-cli` crates.

use foldersync_cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_or_exit();

    // Diagnostics go to stderr so they never interleave with event lines.
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("FolderSync starting");

    foldersync_cli::run(&cli)?;

    Ok(())
}
