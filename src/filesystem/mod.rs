//! In-memory namespace shared by all workers.
//!
//! The namespace is a tree of named entries, where nodes can be either
//! directories (that can contain other nodes) or files. Paths are resolved
//! from the root one segment at a time.

mod path;
mod tree;

pub use path::FsPath;
pub use tree::{CreateError, DeleteError, DeletePolicy, MoveError, NodeKind, TreeStore};
