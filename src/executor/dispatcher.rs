use std::sync::Arc;

use snafu::{ResultExt, Snafu};
use tracing::{debug, trace};

use crate::commands::{Command, ParseError, QueuedCommand};
use crate::queue::BoundedQueue;

/// Producer side of the command queue: parses input lines in order and
/// hands the resulting commands to the workers.
pub struct Dispatcher {
    queue: Arc<BoundedQueue<QueuedCommand>>,
}

impl Dispatcher {
    pub fn new(queue: Arc<BoundedQueue<QueuedCommand>>) -> Self {
        Self { queue }
    }

    /// Enqueues every command found in `lines` and returns how many were
    /// dispatched. Stops at the first malformed line.
    ///
    /// The queue is closed on return in every case, so the workers drain
    /// whatever was already accepted and then exit.
    pub fn dispatch<'a, I>(&self, lines: I) -> Result<usize, DispatchError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let result = self.enqueue_all(lines);
        self.queue.close();
        result
    }

    fn enqueue_all<'a, I>(&self, lines: I) -> Result<usize, DispatchError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut dispatched = 0;

        for (index, line) in lines.into_iter().enumerate() {
            let line_number = index + 1;
            let Some(command) = Command::parse(line).context(InvalidCommandSnafu {
                line_number,
                line: line.trim(),
            })?
            else {
                continue;
            };

            trace!("Dispatching line {}: {:?}", line_number, command);
            self.queue
                .enqueue(QueuedCommand {
                    line_number,
                    command,
                })
                .map_err(|_| DispatchError::QueueClosed { line_number })?;
            dispatched += 1;
        }

        debug!("Dispatched {} commands", dispatched);
        Ok(dispatched)
    }
}

#[derive(Debug, Snafu)]
pub enum DispatchError {
    #[snafu(display("Invalid command on line {}: '{}'", line_number, line))]
    InvalidCommand {
        line_number: usize,
        line: String,
        source: ParseError,
    },
    #[snafu(display("Command queue closed before line {} was dispatched", line_number))]
    QueueClosed { line_number: usize },
}
