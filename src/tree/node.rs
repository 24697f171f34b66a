//! A single typed, reactive property node.
//!
//! Every node stores an optional cached value plus three callback chains:
//!
//! - **coercions** (`T -> T`): applied left-to-right on every `set`; the
//!   result is what gets stored and propagated. Typical use is clamping a
//!   requested gain or rate to what the hardware can actually do.
//! - **subscribers** (`&T -> Result<()>`): side effects (usually register
//!   writes) invoked in registration order after coercion, on every `set`.
//! - **publisher** (`() -> Result<T>`): at most one; when present, `get`
//!   always invokes it and never returns the cached value.
//!
//! A per-node mutex guards the cached value, coercion execution, and the
//! whole subscriber sequence, so a slow subscriber blocks only operations
//! on its own node. Callbacks run synchronously on the caller's thread and
//! must not re-enter their own node.

use parking_lot::Mutex;

use crate::error::{SdrError, SdrResult};
use crate::tree::PropPath;

type Coercer<T> = Box<dyn Fn(T) -> T + Send>;
type Subscriber<T> = Box<dyn Fn(&T) -> anyhow::Result<()> + Send>;
type Publisher<T> = Box<dyn Fn() -> anyhow::Result<T> + Send>;

struct NodeState<T> {
    current: Option<T>,
    coercers: Vec<Coercer<T>>,
    subscribers: Vec<Subscriber<T>>,
    publisher: Option<Publisher<T>>,
}

/// A typed property node owned by a [`PropertyTree`](crate::tree::PropertyTree).
///
/// Handles returned by `create`/`access` are cheap clones of the node's
/// `Arc`; the tree remains the structural owner. Drop handles before
/// tearing the tree down.
pub struct PropertyNode<T> {
    path: PropPath,
    state: Mutex<NodeState<T>>,
}

impl<T> std::fmt::Debug for PropertyNode<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyNode")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl<T: Clone + Send + 'static> PropertyNode<T> {
    pub(crate) fn new(path: PropPath) -> Self {
        Self {
            path,
            state: Mutex::new(NodeState {
                current: None,
                coercers: Vec::new(),
                subscribers: Vec::new(),
                publisher: None,
            }),
        }
    }

    /// Full path of this node.
    pub fn path(&self) -> &PropPath {
        &self.path
    }

    /// Run the coercion chain on `value`, store the result, then invoke
    /// every subscriber in registration order with the coerced value.
    ///
    /// A subscriber failure surfaces as [`SdrError::HardwareWrite`] and
    /// stops the sequence; subscribers already invoked are not rolled
    /// back. Returns `&self` so bring-up code can chain calls.
    pub fn set(&self, value: T) -> SdrResult<&Self> {
        let mut state = self.state.lock();
        let coerced = state.coercers.iter().fold(value, |v, coercer| coercer(v));
        state.current = Some(coerced.clone());
        for subscriber in &state.subscribers {
            subscriber(&coerced).map_err(|source| SdrError::HardwareWrite {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(self)
    }

    /// Current value of this node.
    ///
    /// When a publisher is registered it is always invoked, so the result
    /// is never stale. Without a publisher, returns the cached value or
    /// [`SdrError::NotInitialized`] if nothing was ever set.
    pub fn get(&self) -> SdrResult<T> {
        let state = self.state.lock();
        match &state.publisher {
            Some(publisher) => publisher().map_err(|source| SdrError::HardwareRead {
                path: self.path.clone(),
                source,
            }),
            None => state.current.clone().ok_or_else(|| SdrError::NotInitialized {
                path: self.path.clone(),
            }),
        }
    }

    /// Append a coercion to the chain.
    pub fn coerce(&self, f: impl Fn(T) -> T + Send + 'static) -> &Self {
        self.state.lock().coercers.push(Box::new(f));
        self
    }

    /// Append a subscriber to the chain.
    pub fn subscribe(&self, f: impl Fn(&T) -> anyhow::Result<()> + Send + 'static) -> &Self {
        self.state.lock().subscribers.push(Box::new(f));
        self
    }

    /// Register the publisher for this node.
    ///
    /// Fails with [`SdrError::AlreadyPublished`] if one is already
    /// registered; overriding a publisher is never silent.
    pub fn publish(&self, f: impl Fn() -> anyhow::Result<T> + Send + 'static) -> SdrResult<&Self> {
        let mut state = self.state.lock();
        if state.publisher.is_some() {
            return Err(SdrError::AlreadyPublished {
                path: self.path.clone(),
            });
        }
        state.publisher = Some(Box::new(f));
        Ok(self)
    }

    /// True once a value has been stored (independent of any publisher).
    pub fn is_initialized(&self) -> bool {
        self.state.lock().current.is_some()
    }
}
