mod reporter;

#[cfg(test)]
pub use reporter::RecordingReporter;
pub use reporter::{ConsoleReporter, StatusReporter};
