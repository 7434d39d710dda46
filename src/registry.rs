//! Session-scoped cache enforcing one [`PathNode`] per distinct key.
//!
//! The registry is explicit and injectable: one instance per binding
//! session, passed by reference to every scope and template it serves. Two
//! sessions only share observation state if they share a registry.

use std::cell::RefCell;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::rc::Rc;

use termtree::Tree;
use tracing::instrument;

use crate::errors::BindResult;
use crate::key;
use crate::node::PathNode;

#[derive(Default)]
pub struct PathRegistry {
    // BTreeMap so child lookup and display are deterministic.
    nodes: RefCell<BTreeMap<String, Rc<PathNode>>>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached node for `path`, constructing it if absent.
    ///
    /// Construction is an iterative bottom-up walk over the segments: each
    /// prefix is looked up or created and registered before the next level
    /// is built, so a node can be found by the very act of being built and
    /// reentrant resolution stays idempotent. Equal keys always yield the
    /// identical instance.
    #[instrument(level = "trace", skip(self))]
    pub fn resolve(&self, path: &str) -> BindResult<Rc<PathNode>> {
        key::validate(path)?;

        let mut parent: Option<Rc<PathNode>> = None;
        let mut prefix = String::with_capacity(path.len());
        for segment in path.split('.') {
            if !prefix.is_empty() {
                prefix.push('.');
            }
            prefix.push_str(segment);

            let node = match self.nodes.borrow_mut().entry(prefix.clone()) {
                Entry::Occupied(occupied) => Rc::clone(occupied.get()),
                Entry::Vacant(vacant) => {
                    let node = Rc::new(PathNode::new(
                        prefix.clone(),
                        segment.to_string(),
                        parent.clone(),
                    ));
                    vacant.insert(Rc::clone(&node));
                    node
                }
            };
            parent = Some(node);
        }

        Ok(parent.expect("validated key has at least one segment"))
    }

    /// Cache probe without construction.
    pub fn lookup(&self, path: &str) -> Option<Rc<PathNode>> {
        self.nodes.borrow().get(path).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.borrow().contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    /// Every registered key, in lexicographic order.
    pub fn keys(&self) -> Vec<String> {
        self.nodes.borrow().keys().cloned().collect()
    }

    /// Every registered node exactly one level below `path`: keys of the
    /// form `path.<segment>` with no further dots. Deeper descendants and
    /// sibling-prefixed keys (`path2.x`) never match.
    #[instrument(level = "trace", skip(self))]
    pub fn children_of(&self, path: &str) -> Vec<Rc<PathNode>> {
        self.nodes
            .borrow()
            .iter()
            .filter_map(|(candidate, node)| {
                let rest = candidate.strip_prefix(path)?.strip_prefix('.')?;
                if !rest.is_empty() && !rest.contains('.') {
                    Some(Rc::clone(node))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Registered nodes without a parent (single-segment keys).
    pub fn roots(&self) -> Vec<Rc<PathNode>> {
        self.nodes
            .borrow()
            .values()
            .filter(|node| node.parent().is_none())
            .map(Rc::clone)
            .collect()
    }

    /// Render the registered forest, one tree per root key.
    pub fn display_forest(&self) -> Vec<Tree<String>> {
        self.roots()
            .iter()
            .map(|root| self.subtree(root))
            .collect()
    }

    fn subtree(&self, node: &Rc<PathNode>) -> Tree<String> {
        let mut tree = Tree::new(node.name().to_string());
        for child in self.children_of(node.key()) {
            tree.push(self.subtree(&child));
        }
        tree
    }
}

impl std::fmt::Debug for PathRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathRegistry")
            .field("nodes", &self.len())
            .finish()
    }
}
