use std::io;
use std::sync::RwLock;

use derive_more::Display;
use hashlink::LinkedHashMap;
use snafu::{Snafu, location};
use tracing::{debug, error};

use crate::ext::RwLockExt;
use crate::filesystem::FsPath;

/// Represents the kind of a namespace entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum NodeKind {
    #[display("file")]
    File,
    #[display("directory")]
    Directory,
}

/// What happens when a non-empty directory is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum DeletePolicy {
    /// The directory is removed together with its whole subtree
    #[default]
    #[display("recursive")]
    Recursive,
    /// The deletion is refused with [`DeleteError::NotEmptyDirectory`]
    #[display("reject_non_empty")]
    RejectNonEmpty,
}

type Children = LinkedHashMap<String, FilesystemNode>;

/// One entry of the namespace. A node is owned by its parent's child map and
/// its name is the key under which it is stored there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilesystemNode {
    File,
    Directory { children: Children },
}

/// Why a path did not lead to a directory
enum Unresolved {
    Missing,
    NotDirectory,
}

impl FilesystemNode {
    pub fn root() -> Self {
        Self::empty(NodeKind::Directory)
    }

    fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::File => FilesystemNode::File,
            NodeKind::Directory => FilesystemNode::Directory {
                children: LinkedHashMap::new(),
            },
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            FilesystemNode::File => NodeKind::File,
            FilesystemNode::Directory { .. } => NodeKind::Directory,
        }
    }

    /// Number of nodes in this subtree, including `self`
    pub fn subtree_len(&self) -> usize {
        match self {
            FilesystemNode::File => 1,
            FilesystemNode::Directory { children } => {
                1 + children.values().map(Self::subtree_len).sum::<usize>()
            }
        }
    }

    fn resolve(&self, segments: &[String]) -> Option<&FilesystemNode> {
        segments
            .iter()
            .try_fold(self, |current, segment| match current {
                FilesystemNode::Directory { children } => children.get(segment.as_str()),
                FilesystemNode::File => None,
            })
    }

    fn resolve_directory(&self, segments: &[String]) -> Result<&Children, Unresolved> {
        let mut current = self;
        for segment in segments {
            current = match current {
                FilesystemNode::Directory { children } => children
                    .get(segment.as_str())
                    .ok_or(Unresolved::Missing)?,
                FilesystemNode::File => return Err(Unresolved::NotDirectory),
            };
        }

        match current {
            FilesystemNode::Directory { children } => Ok(children),
            FilesystemNode::File => Err(Unresolved::NotDirectory),
        }
    }

    fn resolve_directory_mut(&mut self, segments: &[String]) -> Result<&mut Children, Unresolved> {
        let mut current = self;
        for segment in segments {
            current = match current {
                FilesystemNode::Directory { children } => children
                    .get_mut(segment.as_str())
                    .ok_or(Unresolved::Missing)?,
                FilesystemNode::File => return Err(Unresolved::NotDirectory),
            };
        }

        match current {
            FilesystemNode::Directory { children } => Ok(children),
            FilesystemNode::File => Err(Unresolved::NotDirectory),
        }
    }

    /// Inserts `node` as `name` under the directory at `parent`, handing the
    /// node back if that directory does not exist.
    fn attach(
        &mut self,
        parent: &[String],
        name: &str,
        node: FilesystemNode,
    ) -> Result<(), FilesystemNode> {
        match self.resolve_directory_mut(parent) {
            Ok(children) => {
                children.insert(name.to_string(), node);
                Ok(())
            }
            Err(_) => Err(node),
        }
    }

    fn detach(&mut self, parent: &[String], name: &str) -> Option<FilesystemNode> {
        self.resolve_directory_mut(parent)
            .ok()
            .and_then(|children| children.remove(name))
    }
}

/// Receives every node of a snapshot, parents before their children
pub trait TreeVisitor {
    fn visit(&mut self, path: &FsPath, kind: NodeKind, depth: usize);
}

impl<F> TreeVisitor for F
where
    F: FnMut(&FsPath, NodeKind, usize),
{
    fn visit(&mut self, path: &FsPath, kind: NodeKind, depth: usize) {
        self(path, kind, depth)
    }
}

/// The shared namespace.
///
/// Every operation runs under one tree-wide lock: lookups and snapshots share
/// the read side, create, delete and move take the write side. Each call is
/// atomic with respect to every other call.
#[derive(Debug)]
pub struct TreeStore {
    root: RwLock<FilesystemNode>,
    delete_policy: DeletePolicy,
}

impl Default for TreeStore {
    fn default() -> Self {
        Self::new(DeletePolicy::default())
    }
}

impl TreeStore {
    pub fn new(delete_policy: DeletePolicy) -> Self {
        Self {
            root: RwLock::new(FilesystemNode::root()),
            delete_policy,
        }
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        self.delete_policy
    }

    pub fn create(&self, path: &FsPath, kind: NodeKind) -> Result<(), CreateError> {
        let Some((parent, name)) = path.split_last() else {
            return Err(CreateError::AlreadyExists);
        };

        let mut root = self.root.write_or_abort();
        let children = root
            .resolve_directory_mut(parent)
            .map_err(|unresolved| match unresolved {
                Unresolved::Missing => CreateError::ParentMissing,
                Unresolved::NotDirectory => CreateError::ParentNotDirectory,
            })?;

        if children.contains_key(name) {
            return Err(CreateError::AlreadyExists);
        }
        children.insert(name.to_string(), FilesystemNode::empty(kind));
        debug!("Created {} '{}'", kind, path);

        Ok(())
    }

    pub fn lookup(&self, path: &FsPath) -> Option<NodeKind> {
        let root = self.root.read_or_abort();
        root.resolve(path.segments()).map(FilesystemNode::kind)
    }

    pub fn delete(&self, path: &FsPath) -> Result<(), DeleteError> {
        let Some((parent, name)) = path.split_last() else {
            return Err(DeleteError::RootNotRemovable);
        };

        let mut root = self.root.write_or_abort();
        let children = root
            .resolve_directory_mut(parent)
            .map_err(|_| DeleteError::NotFound)?;

        match children.get(name) {
            None => return Err(DeleteError::NotFound),
            Some(FilesystemNode::Directory { children: entries })
                if !entries.is_empty() && self.delete_policy == DeletePolicy::RejectNonEmpty =>
            {
                return Err(DeleteError::NotEmptyDirectory);
            }
            Some(_) => {}
        }

        if let Some(removed) = children.remove(name) {
            debug!("Deleted '{}' ({} node(s))", path, removed.subtree_len());
        }

        Ok(())
    }

    /// Moves the node at `src` to `dst`, renaming it to the last segment of
    /// `dst`. Detaching and reattaching happen under one write lock, so no
    /// other operation observes the node in both places or in neither.
    pub fn move_node(&self, src: &FsPath, dst: &FsPath) -> Result<(), MoveError> {
        let Some((src_parent, src_name)) = src.split_last() else {
            return Err(MoveError::InvalidMoveIntoOwnSubtree);
        };

        let mut root = self.root.write_or_abort();

        let Some(src_kind) = root.resolve(src.segments()).map(FilesystemNode::kind) else {
            return Err(MoveError::SrcNotFound);
        };
        if dst == src {
            return Err(MoveError::DstNameTaken);
        }
        if src_kind == NodeKind::Directory && dst.is_strict_descendant_of(src) {
            return Err(MoveError::InvalidMoveIntoOwnSubtree);
        }
        let Some((dst_parent, dst_name)) = dst.split_last() else {
            return Err(MoveError::DstNameTaken);
        };

        match root.resolve_directory(dst_parent) {
            Err(_) => return Err(MoveError::DstParentMissing),
            Ok(children) if children.contains_key(dst_name) => {
                return Err(MoveError::DstNameTaken);
            }
            Ok(_) => {}
        }

        let node = root
            .detach(src_parent, src_name)
            .ok_or(MoveError::SrcNotFound)?;

        if let Err(node) = root.attach(dst_parent, dst_name, node) {
            error!(
                "Assumption that the destination survives detaching the source failed {}",
                location!()
            );
            if root.attach(src_parent, src_name, node).is_err() {
                error!("Failed to restore '{}' after an aborted move", src);
            }
            return Err(MoveError::DstParentMissing);
        }
        debug!("Moved '{}' to '{}'", src, dst);

        Ok(())
    }

    /// Walks the whole tree in pre-order, children in insertion order.
    /// Holds the read lock for the entire walk, so the visitor sees a single
    /// point-in-time state.
    pub fn snapshot<V>(&self, visitor: &mut V)
    where
        V: TreeVisitor + ?Sized,
    {
        let root = self.root.read_or_abort();
        Self::walk(&root, &FsPath::root(), visitor);
    }

    fn walk<V>(node: &FilesystemNode, path: &FsPath, visitor: &mut V)
    where
        V: TreeVisitor + ?Sized,
    {
        visitor.visit(path, node.kind(), path.segments().len());
        if let FilesystemNode::Directory { children } = node {
            for (name, child) in children {
                Self::walk(child, &path.join(name), visitor);
            }
        }
    }

    /// Writes one line per node holding its full path, root first
    pub fn render<W: io::Write>(&self, writer: W) -> io::Result<()> {
        let mut renderer = LineRenderer {
            writer,
            failure: None,
        };
        self.snapshot(&mut renderer);

        match renderer.failure {
            Some(err) => Err(err),
            None => renderer.writer.flush(),
        }
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.root.read_or_abort().subtree_len()
    }
}

struct LineRenderer<W> {
    writer: W,
    failure: Option<io::Error>,
}

impl<W: io::Write> TreeVisitor for LineRenderer<W> {
    fn visit(&mut self, path: &FsPath, _kind: NodeKind, _depth: usize) {
        if self.failure.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.writer, "{path}") {
            self.failure = Some(err);
        }
    }
}

#[derive(Debug, Snafu, Clone, Copy, PartialEq, Eq)]
pub enum CreateError {
    #[snafu(display("already exists"))]
    AlreadyExists,
    #[snafu(display("parent directory does not exist"))]
    ParentMissing,
    #[snafu(display("parent is not a directory"))]
    ParentNotDirectory,
}

#[derive(Debug, Snafu, Clone, Copy, PartialEq, Eq)]
pub enum DeleteError {
    #[snafu(display("not found"))]
    NotFound,
    #[snafu(display("directory is not empty"))]
    NotEmptyDirectory,
    #[snafu(display("the root cannot be removed"))]
    RootNotRemovable,
}

#[derive(Debug, Snafu, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    #[snafu(display("source not found"))]
    SrcNotFound,
    #[snafu(display("destination parent directory does not exist"))]
    DstParentMissing,
    #[snafu(display("destination name is taken"))]
    DstNameTaken,
    #[snafu(display("cannot move a directory into its own subtree"))]
    InvalidMoveIntoOwnSubtree,
}
