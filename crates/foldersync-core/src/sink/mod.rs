/// Log destinations for sync events.
///
/// Each event is rendered once through its `Display` impl and the same
/// line is written to every destination. A failing destination is reported
/// through `tracing` and never interrupts a pass.
use crate::model::SyncEvent;
use crate::reconcile::PassObserver;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// A destination for newline-terminated log lines.
pub trait LogSink: Send {
    /// Write `line` followed by a newline.
    fn write_line(&self, line: &str) -> io::Result<()>;

    /// Short name used in diagnostics when a write fails.
    fn describe(&self) -> String;
}

/// Standard output.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut out = io::stdout().lock();
        writeln!(out, "{line}")?;
        out.flush()
    }

    fn describe(&self) -> String {
        "console".to_owned()
    }
}

/// Append-only log file, created if missing and flushed after every line.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }
}

impl LogSink for FileSink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut file = self.file.lock();
        writeln!(file, "{line}")?;
        file.flush()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fans every event out to a set of sinks.
///
/// Implements [`PassObserver`], so it plugs straight into the reconciler or
/// the runner.
#[derive(Default)]
pub struct EventLog {
    sinks: Vec<Box<dyn LogSink>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Console plus, when `log_file` is given, an append-only file.
    pub fn console_and_file(log_file: Option<&Path>) -> io::Result<Self> {
        let mut log = Self::new().with_sink(ConsoleSink);
        if let Some(path) = log_file {
            log = log.with_sink(FileSink::open(path)?);
        }
        Ok(log)
    }

    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Write one line to every sink.
    pub fn write_line(&self, line: &str) {
        for sink in &self.sinks {
            if let Err(err) = sink.write_line(line) {
                warn!("Failed to write log line to {}: {err}", sink.describe());
            }
        }
    }
}

impl PassObserver for EventLog {
    fn on_event(&mut self, event: &SyncEvent) {
        self.write_line(&event.to_string());
    }
}
