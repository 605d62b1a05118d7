use std::path::Path;

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, warn};

use crate::filesystem::DeletePolicy;
use crate::queue::DEFAULT_QUEUE_CAPACITY;

const QUEUE_CAPACITY_KEY: &str = "queue_capacity";
const DELETE_POLICY_KEY: &str = "delete_policy";

/// Tunables of the queue and the tree, optionally read from a YAML file:
///
/// ```yaml
/// queue_capacity: 10
/// delete_policy: recursive # or reject_non_empty
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub queue_capacity: usize,
    pub delete_policy: DeletePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            delete_policy: DeletePolicy::default(),
        }
    }
}

impl EngineConfig {
    /// Reads the config at `path`, or falls back to the defaults when no
    /// path was given.
    pub async fn read(path: Option<&Path>) -> Result<Self, EngineConfigError> {
        match path {
            Some(path) => Self::from_path(path).await,
            None => {
                debug!("No engine config given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, EngineConfigError> {
        debug!("Reading engine config file: {}", path.display());
        let bytes = fs::read(path).await.context(ReadSnafu {
            file_path: path.display().to_string(),
        })?;
        debug!("Successfully read engine config file: {} bytes", bytes.len());

        let contents = String::from_utf8(bytes).context(EncodingSnafu {
            file_path: path.display().to_string(),
        })?;
        contents.as_str().try_into()
    }

    fn apply_entries(
        mut self,
        top_level: &LinkedHashMap<Yaml, Yaml>,
    ) -> Result<Self, EngineConfigError> {
        for (key, value) in top_level {
            match key.as_str() {
                Some(QUEUE_CAPACITY_KEY) => self.queue_capacity = parse_queue_capacity(value)?,
                Some(DELETE_POLICY_KEY) => self.delete_policy = parse_delete_policy(value)?,
                _ => warn!("Ignoring unknown engine config key: {}", describe(key)),
            }
        }
        Ok(self)
    }
}

impl TryFrom<&str> for EngineConfig {
    type Error = EngineConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents)
            .map_err(|e| EngineConfigError::ParseError { source: e })?;
        let document = documents
            .first()
            .ok_or(EngineConfigError::MalformedConfig)?;

        let top_level = document
            .as_mapping()
            .ok_or(EngineConfigError::TopLevelNotMap)?;

        let config = Self::default().apply_entries(top_level)?;
        debug!("Loaded engine config: {:?}", config);
        Ok(config)
    }
}

fn parse_queue_capacity(value: &Yaml) -> Result<usize, EngineConfigError> {
    let capacity = match value {
        Yaml::Value(Scalar::Integer(raw)) => usize::try_from(*raw).ok().filter(|n| *n > 0),
        _ => None,
    };
    capacity.ok_or_else(|| EngineConfigError::InvalidQueueCapacity {
        value: describe(value),
    })
}

fn parse_delete_policy(value: &Yaml) -> Result<DeletePolicy, EngineConfigError> {
    match value.as_str() {
        Some("recursive") => Ok(DeletePolicy::Recursive),
        Some("reject_non_empty") => Ok(DeletePolicy::RejectNonEmpty),
        _ => Err(EngineConfigError::InvalidDeletePolicy {
            value: describe(value),
        }),
    }
}

fn describe(value: &Yaml) -> String {
    match value {
        Yaml::Value(Scalar::String(text)) => format!("'{text}'"),
        Yaml::Value(Scalar::Integer(number)) => number.to_string(),
        other => format!("{other:?}"),
    }
}

#[derive(Debug, Snafu)]
pub enum EngineConfigError {
    #[snafu(display("Failed to read the engine config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Engine config file {} is not valid UTF-8", file_path))]
    EncodingError {
        file_path: String,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the engine config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted engine config file"))]
    MalformedConfig,
    #[snafu(display("Top level of the engine config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("'{}' must be a positive integer, got {}", QUEUE_CAPACITY_KEY, value))]
    InvalidQueueCapacity { value: String },
    #[snafu(display(
        "'{}' must be 'recursive' or 'reject_non_empty', got {}",
        DELETE_POLICY_KEY,
        value
    ))]
    InvalidDeletePolicy { value: String },
}
