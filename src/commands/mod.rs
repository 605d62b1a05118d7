mod command;
mod outcome;

pub use command::{Command, ParseError, QueuedCommand};
pub use outcome::CommandOutcome;
