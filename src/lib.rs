//! Demand-driven reactive data binding.
//!
//! A textual template is scanned once for variable references of the form
//! `base.path.to.value`; each reference becomes a [`PathNode`] in a
//! path-addressed observation graph. A [`ReactiveScope`] then wraps a plain
//! data value, instrumenting only the properties that were actually
//! referenced (selective instrumentation) — assigning through the scope
//! republishes the new value to every interested listener, synchronously.
//!
//! Discovery must run before the scope is constructed: instrumentation is
//! driven by what was referenced, not by what exists on the data.
//!
//! ```
//! use std::collections::BTreeMap;
//! use std::rc::Rc;
//! use pathbind::{PathRegistry, ReactiveScope, Value};
//!
//! let registry = Rc::new(PathRegistry::new());
//!
//! // Discovery: reference "$data.user.name" before the data is wrapped.
//! let node = registry.resolve("$data.user.name").unwrap();
//! let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! node.on_change(move |value| sink.borrow_mut().push(value.cloned()));
//!
//! let mut user = BTreeMap::new();
//! user.insert("name".to_string(), Value::from("Ada"));
//! let mut data = BTreeMap::new();
//! data.insert("user".to_string(), Value::Object(user));
//!
//! // Binding fires the initial push, later writes republish.
//! let scope = ReactiveScope::new(Rc::clone(&registry), data, "$data").unwrap();
//! scope.child("user").unwrap().set("name", "Grace");
//!
//! assert_eq!(
//!     seen.borrow().last().cloned().flatten(),
//!     Some(Value::from("Grace"))
//! );
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod exitcode;
pub mod key;
pub mod node;
pub mod registry;
pub mod scope;
pub mod template;
pub mod util;
pub mod value;

pub use config::Settings;
pub use errors::{BindError, BindResult};
pub use node::PathNode;
pub use registry::PathRegistry;
pub use scope::ReactiveScope;
pub use template::Template;
pub use value::Value;
