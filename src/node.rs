//! Path observation nodes: one deduplicated unit per dotted key.
//!
//! A [`PathNode`] owns the ordered listener list for its key and a link to
//! its parent node. Subscribing to a node also plants projection wrappers up
//! the ancestor chain, so a leaf listener is transitively notified whenever
//! any ancestor changes, always with the value re-derived for its own path.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::value::{project, Value};

/// Callback fired with a path's new value, or `None` when an ancestor's new
/// value does not carry the member.
pub type Listener = Rc<dyn Fn(Option<&Value>)>;

pub struct PathNode {
    key: String,
    name: String,
    parent: Option<Rc<PathNode>>,
    listeners: RefCell<Vec<Listener>>,
}

impl PathNode {
    /// Nodes are only built by the registry, which enforces one instance per
    /// key and links the (already registered) parent.
    pub(crate) fn new(key: String, name: String, parent: Option<Rc<PathNode>>) -> Self {
        Self {
            key,
            name,
            parent,
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// Full dotted key; the node's identity.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Final segment of the key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Node for the key with the last segment stripped, absent for roots.
    pub fn parent(&self) -> Option<&Rc<PathNode>> {
        self.parent.as_ref()
    }

    /// Direct listeners plus projection wrappers planted by descendants.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Register `callback` for changes on this key.
    ///
    /// The callback is appended to this node's list, then a projection
    /// wrapper is appended at every ancestor: each wrapper receives the
    /// ancestor's new value, projects it one member deeper, and forwards the
    /// result. Wrappers land in each ancestor's list in `on_change` call
    /// order, interleaved with that ancestor's own direct listeners; fan-out
    /// order is registration order.
    pub fn on_change(self: &Rc<Self>, callback: impl Fn(Option<&Value>) + 'static) {
        trace!(key = %self.key, "subscribe");
        let mut callback: Listener = Rc::new(callback);
        self.listeners.borrow_mut().push(Rc::clone(&callback));

        let mut member = self.name.clone();
        let mut ancestor = self.parent.clone();
        while let Some(node) = ancestor {
            let inner = callback;
            let name = member;
            callback = Rc::new(move |value: Option<&Value>| inner(project(value, &name)));
            node.listeners.borrow_mut().push(Rc::clone(&callback));
            member = node.name.clone();
            ancestor = node.parent.clone();
        }
    }

    /// Push a new value to every listener, synchronously, in registration
    /// order. No memoization: identical successive values fan out each time.
    ///
    /// This notifies only; it never writes through to any scope's backing
    /// store, so a forced push (e.g. from input wiring) leaves the stored
    /// value untouched until the scope is explicitly assigned.
    ///
    /// The list is snapshotted first: listeners registered during the
    /// fan-out are not invoked until the next push.
    pub fn change(&self, value: Option<&Value>) {
        let snapshot: Vec<Listener> = self.listeners.borrow().clone();
        trace!(key = %self.key, listeners = snapshot.len(), "fan-out");
        for listener in snapshot {
            listener(value);
        }
    }
}

impl fmt::Debug for PathNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathNode")
            .field("key", &self.key)
            .field("listeners", &self.listeners.borrow().len())
            .field("parent", &self.parent.as_ref().map(|p| p.key()))
            .finish()
    }
}
