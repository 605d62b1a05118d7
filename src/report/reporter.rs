use std::io::{self, Write};
use std::time::Duration;

use colored::Colorize;
use supports_color::Stream;
use tracing::debug;

use crate::commands::CommandOutcome;
use crate::executor::RunSummary;

/// Receives the user-visible status of a run. Called concurrently by every
/// worker, so implementations must serialize their own output.
pub trait StatusReporter: Send + Sync {
    fn command_finished(&self, outcome: &CommandOutcome);
    fn run_finished(&self, summary: &RunSummary, elapsed: Duration);
}

/// Prints one status line per command to stdout
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    colored: bool,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            colored: supports_color::on(Stream::Stdout).is_some(),
        }
    }

    fn write_line(&self, line: impl std::fmt::Display) {
        let mut stdout = io::stdout().lock();
        if let Err(err) = writeln!(stdout, "{line}") {
            debug!("Failed to write status line: {}", err);
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusReporter for ConsoleReporter {
    fn command_finished(&self, outcome: &CommandOutcome) {
        let line = outcome.to_string();
        if !self.colored {
            self.write_line(line);
        } else if outcome.is_success() {
            self.write_line(line.green());
        } else {
            self.write_line(line.red());
        }
    }

    fn run_finished(&self, summary: &RunSummary, elapsed: Duration) {
        let line = format!(
            "Completed {} commands in {:.4} seconds.",
            summary.total_applied(),
            elapsed.as_secs_f64()
        );
        if self.colored {
            self.write_line(line.bold());
        } else {
            self.write_line(line);
        }
    }
}

/// Keeps every status line in memory
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: std::sync::Mutex<Vec<String>>,
    finished: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl RecordingReporter {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("reporter lock poisoned").clone()
    }

    pub fn was_finished(&self) -> bool {
        self.finished.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl StatusReporter for RecordingReporter {
    fn command_finished(&self, outcome: &CommandOutcome) {
        self.lines
            .lock()
            .expect("reporter lock poisoned")
            .push(outcome.to_string());
    }

    fn run_finished(&self, _summary: &RunSummary, _elapsed: Duration) {
        self.finished
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }
}
