use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// Applies a file of namespace commands with a pool of worker threads and
/// writes the resulting tree.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    /// File with one command per line
    pub input: PathBuf,

    /// Where the final tree is written
    pub output: PathBuf,

    /// Number of worker threads applying commands
    pub workers: NonZeroUsize,

    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// YAML file overriding the queue capacity and delete policy
    #[clap(long, short)]
    pub config: Option<PathBuf>,
}
