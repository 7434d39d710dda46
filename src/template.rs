//! Template scanning: discovers path references and renders live text.
//!
//! A template is scanned once for references of the form
//! `base.path.to.value`. Every reference is resolved through the registry at
//! parse time — before any scope is constructed over the data — so the
//! registry sees each referenced path and scope construction can instrument
//! exactly those properties. The text is split into static and dynamic
//! fragments; each dynamic fragment subscribes to its node and rewrites
//! itself on every push.

use std::cell::RefCell;
use std::rc::Rc;

use itertools::Itertools;
use regex::Regex;
use tracing::{debug, instrument};

use crate::errors::BindResult;
use crate::key;
use crate::registry::PathRegistry;
use crate::value::Value;

enum Fragment {
    Static(String),
    Dynamic {
        path: String,
        text: Rc<RefCell<String>>,
    },
}

pub struct Template {
    base_key: String,
    fragments: Vec<Fragment>,
}

impl Template {
    /// Scan `text` for `base_key.path` references and wire each one.
    ///
    /// For every occurrence the full key is resolved (creating the node if
    /// absent) and a render listener is subscribed that rewrites the
    /// fragment with the pushed value's text, or with `placeholder` when the
    /// push carries no value. Until the first push, a dynamic fragment shows
    /// the reference text itself.
    #[instrument(level = "debug", skip(registry, text, placeholder))]
    pub fn parse(
        registry: &Rc<PathRegistry>,
        base_key: &str,
        text: &str,
        placeholder: &str,
    ) -> BindResult<Template> {
        key::validate(base_key)?;

        // Segments after the base key: identifiers joined by single dots, so
        // a trailing dot in prose is not swallowed into the reference.
        let pattern = Regex::new(&format!(
            r"{}\.([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)",
            regex::escape(base_key)
        ))
        .unwrap();

        let mut fragments = Vec::new();
        let mut cursor = 0;
        for captures in pattern.captures_iter(text) {
            let whole = captures.get(0).unwrap();
            let reference = captures.get(1).unwrap().as_str();

            if whole.start() > cursor {
                fragments.push(Fragment::Static(text[cursor..whole.start()].to_string()));
            }
            cursor = whole.end();

            let full_key = key::make_key(base_key, reference)?;
            let node = registry.resolve(&full_key)?;

            let cell = Rc::new(RefCell::new(reference.to_string()));
            let target = Rc::clone(&cell);
            let absent = placeholder.to_string();
            node.on_change(move |value: Option<&Value>| {
                *target.borrow_mut() = match value {
                    Some(Value::Null) | None => absent.clone(),
                    Some(value) => value.to_string(),
                };
            });

            fragments.push(Fragment::Dynamic {
                path: full_key,
                text: cell,
            });
        }
        if cursor < text.len() {
            fragments.push(Fragment::Static(text[cursor..].to_string()));
        }

        let template = Template {
            base_key: base_key.to_string(),
            fragments,
        };
        debug!(
            base_key,
            references = template.reference_count(),
            "template scanned"
        );
        Ok(template)
    }

    /// Concatenate current fragment contents.
    pub fn render(&self) -> String {
        self.fragments
            .iter()
            .map(|fragment| match fragment {
                Fragment::Static(text) => text.clone(),
                Fragment::Dynamic { text, .. } => text.borrow().clone(),
            })
            .collect()
    }

    /// Distinct referenced keys, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.fragments
            .iter()
            .filter_map(|fragment| match fragment {
                Fragment::Dynamic { path, .. } => Some(path.clone()),
                Fragment::Static(_) => None,
            })
            .unique()
            .sorted()
            .collect()
    }

    /// Number of reference occurrences (repeats counted).
    pub fn reference_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|fragment| matches!(fragment, Fragment::Dynamic { .. }))
            .count()
    }

    pub fn base_key(&self) -> &str {
        &self.base_key
    }
}

impl std::fmt::Debug for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Template")
            .field("base_key", &self.base_key)
            .field("references", &self.reference_count())
            .finish()
    }
}
