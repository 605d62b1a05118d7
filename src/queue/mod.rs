//! Bounded producer/consumer queue used to hand commands to the workers.

mod bounded_queue;

pub use bounded_queue::{BoundedQueue, DEFAULT_QUEUE_CAPACITY};
