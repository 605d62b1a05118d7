use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use compio::fs;
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::RuntimeConfig;
use crate::config::{EngineConfig, EngineConfigError};
use crate::executor::{DispatchError, Dispatcher, RunSummary, WorkerPool, WorkerPoolError};
use crate::filesystem::TreeStore;
use crate::queue::BoundedQueue;
use crate::report::{ConsoleReporter, StatusReporter};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<RunSummary, ApplicationError> {
        Self::run_with_reporter(app_config, Arc::new(ConsoleReporter::new())).await
    }

    /// Runs the whole batch: starts the workers, dispatches the input from
    /// this thread, joins the workers and writes the final tree.
    pub async fn run_with_reporter(
        app_config: impl Into<RuntimeConfig>,
        reporter: Arc<dyn StatusReporter>,
    ) -> Result<RunSummary, ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        let engine_config = EngineConfig::read(app_config.engine_config.as_deref())
            .await
            .context(ConfigSnafu)?;

        let input = read_input(&app_config.input).await?;

        let tree = Arc::new(TreeStore::new(engine_config.delete_policy));
        let queue = Arc::new(BoundedQueue::new(engine_config.queue_capacity));
        debug!(
            "Using a queue of {} slots and the '{}' delete policy",
            queue.capacity(),
            tree.delete_policy()
        );

        let started = Instant::now();
        let pool = WorkerPool::start(
            app_config.workers,
            Arc::clone(&queue),
            Arc::clone(&tree),
            Arc::clone(&reporter),
        )
        .context(WorkerPoolSnafu)?;

        // Workers are joined before a dispatch failure is returned.
        let dispatched = Dispatcher::new(Arc::clone(&queue)).dispatch(input.lines());
        let summary = pool.join().context(WorkerPoolSnafu)?;
        let elapsed = started.elapsed();
        let dispatched = dispatched.context(DispatchSnafu)?;

        info!(
            "Dispatched {} commands, queue high-water mark {}/{}",
            dispatched,
            queue.high_water_mark(),
            queue.capacity()
        );
        reporter.run_finished(&summary, elapsed);

        write_output(&app_config.output, &tree).await?;
        Ok(summary)
    }
}

async fn read_input(path: &Path) -> Result<String, ApplicationError> {
    debug!("Reading commands from {}", path.display());
    let bytes = fs::read(path).await.context(ReadInputSnafu {
        path: path.display().to_string(),
    })?;

    String::from_utf8(bytes).context(InputEncodingSnafu {
        path: path.display().to_string(),
    })
}

async fn write_output(path: &Path, tree: &TreeStore) -> Result<(), ApplicationError> {
    let mut rendered = Vec::new();
    tree.render(&mut rendered).context(WriteOutputSnafu {
        path: path.display().to_string(),
    })?;

    debug!("Writing {} nodes to {}", tree.len(), path.display());
    let result = fs::write(path, rendered).await;
    result.0.context(WriteOutputSnafu {
        path: path.display().to_string(),
    })
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered while loading the engine config"))]
    ConfigError { source: EngineConfigError },
    #[snafu(display("Could not read the input file {}", path))]
    ReadInputError {
        path: String,
        source: std::io::Error,
    },
    #[snafu(display("Input file {} is not valid UTF-8", path))]
    InputEncodingError {
        path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Critical failure encountered in the worker pool"))]
    WorkerPoolError { source: WorkerPoolError },
    #[snafu(display("Critical failure encountered while dispatching commands"))]
    DispatchError { source: DispatchError },
    #[snafu(display("Could not write the output file {}", path))]
    WriteOutputError {
        path: String,
        source: std::io::Error,
    },
}
