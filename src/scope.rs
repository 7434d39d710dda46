//! Reactive scopes: selective instrumentation over plain data values.
//!
//! A [`ReactiveScope`] wraps one data object under a base key. Only the
//! properties for which a child [`PathNode`](crate::node::PathNode) is
//! already registered become observable; everything else is stored untouched
//! and never notifies. Object values assigned to an instrumented property
//! are themselves wrapped as child scopes, so nested reactivity composes
//! lazily, one referenced level at a time.
//!
//! Rust has no property interception, so the scope is an explicit
//! capability: it owns the backing store and exposes typed accessors.
//! Callers read and write through [`get`](ReactiveScope::get) /
//! [`set`](ReactiveScope::set) instead of bare fields; the scope is the
//! handle.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use tracing::{debug, instrument, trace};

use crate::errors::BindResult;
use crate::key;
use crate::node::PathNode;
use crate::registry::PathRegistry;
use crate::value::Value;

enum Slot {
    /// Referenced by a binding but absent from the data.
    Vacant,
    Plain(Value),
    Nested(Rc<ReactiveScope>),
}

struct Property {
    /// Present only for instrumented names; plain storage otherwise.
    node: Option<Rc<PathNode>>,
    slot: Slot,
}

pub struct ReactiveScope {
    key: String,
    registry: Rc<PathRegistry>,
    properties: RefCell<BTreeMap<String, Property>>,
}

impl ReactiveScope {
    /// Wrap `data` under `scope_key`, instrumenting every property for which
    /// the registry holds a direct child node.
    ///
    /// Each instrumented original value is driven through the setter path,
    /// which wraps nested objects and fires the bind-time notification — so
    /// every interested listener receives an initial push during
    /// construction, before any explicit write. Instrumented names with no
    /// corresponding property in `data` fire an initial "no value" push.
    #[instrument(level = "debug", skip(registry, data))]
    pub fn new(
        registry: Rc<PathRegistry>,
        data: BTreeMap<String, Value>,
        scope_key: &str,
    ) -> BindResult<Rc<Self>> {
        key::validate(scope_key)?;
        Ok(Self::build(registry, data, scope_key.to_string()))
    }

    /// Construction after key validation; nested scopes enter here because
    /// their keys are assembled from already-validated parts.
    fn build(registry: Rc<PathRegistry>, mut data: BTreeMap<String, Value>, scope_key: String) -> Rc<Self> {
        let children = registry.children_of(&scope_key);
        debug!(key = %scope_key, instrumented = children.len(), "wrapping scope");

        let scope = Rc::new(Self {
            key: scope_key,
            registry,
            properties: RefCell::new(BTreeMap::new()),
        });

        // Seed the instrumented slots first so the setter can find its node,
        // and pull their original values out of the data.
        let mut originals = Vec::with_capacity(children.len());
        for node in children {
            let original = data.remove(node.name());
            scope.properties.borrow_mut().insert(
                node.name().to_string(),
                Property {
                    node: Some(Rc::clone(&node)),
                    slot: Slot::Vacant,
                },
            );
            originals.push((node, original));
        }

        // Remaining properties were never referenced: stored untouched.
        {
            let mut properties = scope.properties.borrow_mut();
            for (name, value) in data {
                properties.insert(
                    name,
                    Property {
                        node: None,
                        slot: Slot::Plain(value),
                    },
                );
            }
        }

        // Re-assign the originals through the setter, which boxes the value
        // and fires the initial notification.
        for (node, original) in originals {
            match original {
                Some(value) => scope.set(node.name(), value),
                None => node.change(None),
            }
        }

        scope
    }

    /// Base key this scope is addressed by.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether writes to `name` notify listeners.
    pub fn is_instrumented(&self, name: &str) -> bool {
        self.properties
            .borrow()
            .get(name)
            .is_some_and(|property| property.node.is_some())
    }

    /// Store `value` under `name` and republish it.
    ///
    /// For instrumented names, an object value is first replaced by a fresh
    /// child scope keyed `self.key + "." + name` (the stored value for an
    /// object-valued property is always the reactive wrapper), then the
    /// node's listeners receive a snapshot of what was stored. Writes to
    /// non-instrumented names store silently.
    #[instrument(level = "trace", skip(self, value))]
    pub fn set(&self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        let node = self
            .properties
            .borrow()
            .get(name)
            .and_then(|property| property.node.clone());

        let Some(node) = node else {
            self.properties.borrow_mut().insert(
                name.to_string(),
                Property {
                    node: None,
                    slot: Slot::Plain(value),
                },
            );
            return;
        };

        let (slot, stored) = match value {
            Value::Object(map) => {
                // Child key is valid by construction: both parts passed
                // validation when they were registered.
                let child_key = format!("{}.{}", self.key, name);
                let child = Self::build(Rc::clone(&self.registry), map, child_key);
                let snapshot = child.to_value();
                (Slot::Nested(child), snapshot)
            }
            other => (Slot::Plain(other.clone()), other),
        };

        self.properties.borrow_mut().insert(
            name.to_string(),
            Property {
                node: Some(Rc::clone(&node)),
                slot,
            },
        );
        trace!(key = %self.key, name, "republish");
        // Borrow released above: listeners may re-enter this scope.
        node.change(Some(&stored));
    }

    /// Current value of `name`, materialized for nested scopes; `None` for
    /// vacant or unknown names.
    pub fn get(&self, name: &str) -> Option<Value> {
        match &self.properties.borrow().get(name)?.slot {
            Slot::Vacant => None,
            Slot::Plain(value) => Some(value.clone()),
            Slot::Nested(child) => Some(child.to_value()),
        }
    }

    /// Child scope handle for an object-valued instrumented property.
    pub fn child(&self, name: &str) -> Option<Rc<ReactiveScope>> {
        match &self.properties.borrow().get(name)?.slot {
            Slot::Nested(child) => Some(Rc::clone(child)),
            _ => None,
        }
    }

    /// Materialize the whole scope as a plain value. Vacant slots are
    /// omitted, nested scopes recurse.
    pub fn to_value(&self) -> Value {
        let map = self
            .properties
            .borrow()
            .iter()
            .filter_map(|(name, property)| match &property.slot {
                Slot::Vacant => None,
                Slot::Plain(value) => Some((name.clone(), value.clone())),
                Slot::Nested(child) => Some((name.clone(), child.to_value())),
            })
            .collect();
        Value::Object(map)
    }
}

impl fmt::Debug for ReactiveScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactiveScope")
            .field("key", &self.key)
            .field("properties", &self.properties.borrow().len())
            .finish()
    }
}
