use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use snafu::{ResultExt, Snafu};
use tracing::{debug, info, trace};

use crate::commands::QueuedCommand;
use crate::filesystem::TreeStore;
use crate::queue::BoundedQueue;
use crate::report::StatusReporter;

/// Totals gathered when the pool is joined
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunSummary {
    applied_per_worker: Vec<usize>,
}

impl RunSummary {
    pub fn total_applied(&self) -> usize {
        self.applied_per_worker.iter().sum()
    }

    pub fn applied_per_worker(&self) -> &[usize] {
        &self.applied_per_worker
    }
}

/// Fixed set of worker threads consuming commands until the queue is closed
/// and drained.
pub struct WorkerPool {
    handles: Vec<JoinHandle<usize>>,
}

impl WorkerPool {
    pub fn start(
        workers: NonZeroUsize,
        queue: Arc<BoundedQueue<QueuedCommand>>,
        tree: Arc<TreeStore>,
        reporter: Arc<dyn StatusReporter>,
    ) -> Result<Self, WorkerPoolError> {
        debug!("Starting {} worker threads", workers);

        let mut handles = Vec::with_capacity(workers.get());
        for worker_id in 0..workers.get() {
            let queue_for_worker = Arc::clone(&queue);
            let tree = Arc::clone(&tree);
            let reporter = Arc::clone(&reporter);

            let spawned = thread::Builder::new()
                .name(format!("worker-{worker_id}"))
                .spawn(move || {
                    run_worker(worker_id, &queue_for_worker, &tree, reporter.as_ref())
                })
                .context(SpawnSnafu { worker_id });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(err) => {
                    // workers already running drain the queue and exit
                    queue.close();
                    return Err(err);
                }
            }
        }

        Ok(Self { handles })
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to exit
    pub fn join(self) -> Result<RunSummary, WorkerPoolError> {
        let mut applied_per_worker = Vec::with_capacity(self.handles.len());
        let mut panicked = None;

        for (worker_id, handle) in self.handles.into_iter().enumerate() {
            match handle.join() {
                Ok(applied) => applied_per_worker.push(applied),
                Err(_) => {
                    applied_per_worker.push(0);
                    panicked.get_or_insert(worker_id);
                }
            }
        }

        if let Some(worker_id) = panicked {
            return Err(WorkerPoolError::WorkerPanicked { worker_id });
        }

        let summary = RunSummary { applied_per_worker };
        info!(
            "All workers finished, {} commands applied ({:?} per worker)",
            summary.total_applied(),
            summary.applied_per_worker()
        );
        Ok(summary)
    }
}

fn run_worker(
    worker_id: usize,
    queue: &BoundedQueue<QueuedCommand>,
    tree: &TreeStore,
    reporter: &dyn StatusReporter,
) -> usize {
    let mut applied = 0;

    while let Some(QueuedCommand {
        line_number,
        command,
    }) = queue.dequeue()
    {
        trace!("Worker {} applying line {}: {:?}", worker_id, line_number, command);
        let outcome = command.apply(tree);
        reporter.command_finished(&outcome);
        applied += 1;
    }

    debug!(
        "Worker {} reached end of stream after {} commands",
        worker_id, applied
    );
    applied
}

#[derive(Debug, Snafu)]
pub enum WorkerPoolError {
    #[snafu(display("Failed to spawn worker thread {}", worker_id))]
    SpawnError {
        worker_id: usize,
        source: std::io::Error,
    },
    #[snafu(display("Worker thread {} panicked", worker_id))]
    WorkerPanicked { worker_id: usize },
}
