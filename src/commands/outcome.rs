use std::fmt;

use crate::filesystem::{CreateError, DeleteError, FsPath, MoveError, NodeKind};

/// Result of applying one command, rendered as its status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Create {
        path: FsPath,
        kind: NodeKind,
        result: Result<(), CreateError>,
    },
    Lookup {
        path: FsPath,
        found: Option<NodeKind>,
    },
    Delete {
        path: FsPath,
        result: Result<(), DeleteError>,
    },
    Move {
        src: FsPath,
        dst: FsPath,
        result: Result<(), MoveError>,
    },
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        match self {
            CommandOutcome::Create { result, .. } => result.is_ok(),
            CommandOutcome::Lookup { found, .. } => found.is_some(),
            CommandOutcome::Delete { result, .. } => result.is_ok(),
            CommandOutcome::Move { result, .. } => result.is_ok(),
        }
    }
}

fn write_failure<E: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    result: &Result<(), E>,
) -> fmt::Result {
    match result {
        Ok(()) => Ok(()),
        Err(err) => write!(f, " (failed: {err})"),
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Create { path, kind, result } => {
                write!(f, "Create {kind}: {path}")?;
                write_failure(f, result)
            }
            CommandOutcome::Lookup { path, found } => match found {
                Some(_) => write!(f, "Search: {path} found"),
                None => write!(f, "Search: {path} not found"),
            },
            CommandOutcome::Delete { path, result } => {
                write!(f, "Delete: {path}")?;
                write_failure(f, result)
            }
            CommandOutcome::Move { src, dst, result } => {
                write!(f, "Move: {src} to {dst}")?;
                write_failure(f, result)
            }
        }
    }
}
