//! The reactive property tree.
//!
//! A [`PropertyTree`] is a path-addressed collection of typed
//! [`PropertyNode`]s. Hardware subsystems expose their state by creating
//! nodes and wiring coercion/subscriber/publisher callbacks to them at
//! bring-up; runtime callers then read and write by path without knowing
//! which piece of hardware sits behind a node.
//!
//! The value type of a node is fixed at creation and checked with a
//! runtime type tag on every typed access. The tree stores values without
//! inspecting their structure, so opaque domain records (EEPROM maps,
//! ranges, stream commands) flow through it the same way scalars do.
//!
//! # Locking
//!
//! Two levels, never held together:
//!
//! - a short-lived tree-level `RwLock` guards only the path map
//!   (`create`/`pop`/`list` against concurrent structural mutation);
//! - a per-node mutex guards that node's value and callback execution.
//!
//! The structural lock is released before any node lock is taken, so a
//! blocking subscriber on one path never stalls operations on unrelated
//! paths. This is what lets a soft-time scheduling thread `set` stream
//! command paths while a control thread works elsewhere in the tree.

mod node;
mod path;

pub use node::PropertyNode;
pub use path::PropPath;

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{SdrError, SdrResult};

struct NodeEntry {
    type_id: TypeId,
    type_name: &'static str,
    node: Arc<dyn Any + Send + Sync>,
}

/// Hierarchical, path-addressed store of typed, reactive values.
#[derive(Default)]
pub struct PropertyTree {
    nodes: RwLock<BTreeMap<PropPath, NodeEntry>>,
}

impl PropertyTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new node of type `T` at `path`.
    ///
    /// Re-creating an existing path with the same type is a no-op that
    /// returns the existing handle. A type conflict fails with
    /// [`SdrError::AlreadyExists`].
    pub fn create<T: Clone + Send + 'static>(
        &self,
        path: impl Into<PropPath>,
    ) -> SdrResult<Arc<PropertyNode<T>>> {
        let path = path.into();
        let mut nodes = self.nodes.write();
        if let Some(entry) = nodes.get(&path) {
            if entry.type_id != TypeId::of::<T>() {
                return Err(SdrError::AlreadyExists {
                    path,
                    existing: entry.type_name,
                    requested: std::any::type_name::<T>(),
                });
            }
            return downcast_entry::<T>(&path, entry);
        }
        let node = Arc::new(PropertyNode::<T>::new(path.clone()));
        nodes.insert(
            path,
            NodeEntry {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
                node: node.clone(),
            },
        );
        Ok(node)
    }

    /// Handle to the existing node of type `T` at `path`.
    pub fn access<T: Clone + Send + 'static>(
        &self,
        path: impl Into<PropPath>,
    ) -> SdrResult<Arc<PropertyNode<T>>> {
        let path = path.into();
        let nodes = self.nodes.read();
        match nodes.get(&path) {
            Some(entry) => downcast_entry::<T>(&path, entry),
            None => Err(SdrError::NotFound { path }),
        }
    }

    /// True when a node exists at `path` (of any type).
    pub fn exists(&self, path: impl Into<PropPath>) -> bool {
        self.nodes.read().contains_key(&path.into())
    }

    /// Remove the node at `path` and every descendant. Used during
    /// teardown. Fails with [`SdrError::NotFound`] when nothing lives at
    /// or under `path`.
    pub fn pop(&self, path: impl Into<PropPath>) -> SdrResult<()> {
        let path = path.into();
        let mut nodes = self.nodes.write();
        let before = nodes.len();
        nodes.retain(|key, _| !key.starts_with(&path));
        if nodes.len() == before {
            return Err(SdrError::NotFound { path });
        }
        Ok(())
    }

    /// Immediate child segment names under `path`, in lexicographic
    /// order. Empty for leaves and for prefixes with no nodes below them;
    /// never an error.
    pub fn list(&self, path: impl Into<PropPath>) -> Vec<String> {
        let path = path.into();
        let nodes = self.nodes.read();
        let mut children: Vec<String> = Vec::new();
        for key in nodes.range(path.clone()..).map(|(k, _)| k) {
            if !key.starts_with(&path) {
                break;
            }
            if key.len() > path.len() {
                let seg = &key.segments()[path.len()];
                // map iteration is sorted, so duplicates are adjacent
                if children.last().map(String::as_str) != Some(seg.as_str()) {
                    children.push(seg.clone());
                }
            }
        }
        children
    }

    /// A view of this tree with every operation rebased under `prefix`.
    /// The view borrows the tree and cannot outlive it.
    pub fn subtree(&self, prefix: impl Into<PropPath>) -> Subtree<'_> {
        Subtree {
            tree: self,
            prefix: prefix.into(),
        }
    }

    /// Read the value at `path` (see [`PropertyNode::get`]).
    pub fn get<T: Clone + Send + 'static>(&self, path: impl Into<PropPath>) -> SdrResult<T> {
        self.access::<T>(path)?.get()
    }

    /// Write the value at `path` (see [`PropertyNode::set`]).
    pub fn set<T: Clone + Send + 'static>(
        &self,
        path: impl Into<PropPath>,
        value: T,
    ) -> SdrResult<()> {
        self.access::<T>(path)?.set(value).map(|_| ())
    }

    /// Append a coercion to the node at `path`.
    pub fn coerce<T: Clone + Send + 'static>(
        &self,
        path: impl Into<PropPath>,
        f: impl Fn(T) -> T + Send + 'static,
    ) -> SdrResult<()> {
        self.access::<T>(path)?.coerce(f);
        Ok(())
    }

    /// Append a subscriber to the node at `path`.
    pub fn subscribe<T: Clone + Send + 'static>(
        &self,
        path: impl Into<PropPath>,
        f: impl Fn(&T) -> anyhow::Result<()> + Send + 'static,
    ) -> SdrResult<()> {
        self.access::<T>(path)?.subscribe(f);
        Ok(())
    }

    /// Register the publisher for the node at `path`.
    pub fn publish<T: Clone + Send + 'static>(
        &self,
        path: impl Into<PropPath>,
        f: impl Fn() -> anyhow::Result<T> + Send + 'static,
    ) -> SdrResult<()> {
        self.access::<T>(path)?.publish(f).map(|_| ())
    }
}

fn downcast_entry<T: Clone + Send + 'static>(
    path: &PropPath,
    entry: &NodeEntry,
) -> SdrResult<Arc<PropertyNode<T>>> {
    entry
        .node
        .clone()
        .downcast::<PropertyNode<T>>()
        .map_err(|_| SdrError::TypeMismatch {
            path: path.clone(),
            expected: std::any::type_name::<T>(),
            found: entry.type_name,
        })
}

/// A rebased view of a [`PropertyTree`].
///
/// Every operation is transparently prefixed; a node created through a
/// subtree is visible through the underlying tree at the full path and
/// vice versa. Views can be nested.
pub struct Subtree<'t> {
    tree: &'t PropertyTree,
    prefix: PropPath,
}

impl<'t> Subtree<'t> {
    /// The prefix this view rebases under.
    pub fn prefix(&self) -> &PropPath {
        &self.prefix
    }

    fn full(&self, rel: impl Into<PropPath>) -> PropPath {
        self.prefix.join_path(&rel.into())
    }

    /// See [`PropertyTree::create`].
    pub fn create<T: Clone + Send + 'static>(
        &self,
        path: impl Into<PropPath>,
    ) -> SdrResult<Arc<PropertyNode<T>>> {
        self.tree.create::<T>(self.full(path))
    }

    /// See [`PropertyTree::access`].
    pub fn access<T: Clone + Send + 'static>(
        &self,
        path: impl Into<PropPath>,
    ) -> SdrResult<Arc<PropertyNode<T>>> {
        self.tree.access::<T>(self.full(path))
    }

    /// See [`PropertyTree::exists`].
    pub fn exists(&self, path: impl Into<PropPath>) -> bool {
        self.tree.exists(self.full(path))
    }

    /// See [`PropertyTree::pop`].
    pub fn pop(&self, path: impl Into<PropPath>) -> SdrResult<()> {
        self.tree.pop(self.full(path))
    }

    /// See [`PropertyTree::list`].
    pub fn list(&self, path: impl Into<PropPath>) -> Vec<String> {
        self.tree.list(self.full(path))
    }

    /// A further-rebased view under `prefix`.
    pub fn subtree(&self, prefix: impl Into<PropPath>) -> Subtree<'t> {
        Subtree {
            tree: self.tree,
            prefix: self.full(prefix),
        }
    }

    /// See [`PropertyTree::get`].
    pub fn get<T: Clone + Send + 'static>(&self, path: impl Into<PropPath>) -> SdrResult<T> {
        self.tree.get::<T>(self.full(path))
    }

    /// See [`PropertyTree::set`].
    pub fn set<T: Clone + Send + 'static>(
        &self,
        path: impl Into<PropPath>,
        value: T,
    ) -> SdrResult<()> {
        self.tree.set(self.full(path), value)
    }

    /// See [`PropertyTree::coerce`].
    pub fn coerce<T: Clone + Send + 'static>(
        &self,
        path: impl Into<PropPath>,
        f: impl Fn(T) -> T + Send + 'static,
    ) -> SdrResult<()> {
        self.tree.coerce(self.full(path), f)
    }

    /// See [`PropertyTree::subscribe`].
    pub fn subscribe<T: Clone + Send + 'static>(
        &self,
        path: impl Into<PropPath>,
        f: impl Fn(&T) -> anyhow::Result<()> + Send + 'static,
    ) -> SdrResult<()> {
        self.tree.subscribe(self.full(path), f)
    }

    /// See [`PropertyTree::publish`].
    pub fn publish<T: Clone + Send + 'static>(
        &self,
        path: impl Into<PropPath>,
        f: impl Fn() -> anyhow::Result<T> + Send + 'static,
    ) -> SdrResult<()> {
        self.tree.publish(self.full(path), f)
    }
}
