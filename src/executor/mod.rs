//! Producer and consumers around the command queue.

mod dispatcher;
mod worker_pool;

pub use dispatcher::{DispatchError, Dispatcher};
pub use worker_pool::{RunSummary, WorkerPool, WorkerPoolError};
