//! Tests for Template: reference discovery and live rendering

use std::collections::BTreeMap;
use std::io::Write;
use std::rc::Rc;

use pathbind::util::testing::init_test_setup;
use pathbind::{BindError, PathRegistry, ReactiveScope, Template, Value};

fn data(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn object(pairs: &[(&str, Value)]) -> Value {
    Value::Object(data(pairs))
}

// ============================================================
// Discovery Tests
// ============================================================

#[test]
fn given_text_with_references_when_parsing_then_registers_paths() {
    init_test_setup();
    let registry = Rc::new(PathRegistry::new());
    let text = "Hello $app.user.name, you have $app.count new messages.";

    let template = Template::parse(&registry, "$app", text, "").unwrap();

    assert_eq!(template.base_key(), "$app");
    assert_eq!(template.paths(), vec!["$app.count", "$app.user.name"]);
    assert_eq!(template.reference_count(), 2);
    assert!(registry.contains("$app.user.name"));
    assert!(
        registry.contains("$app.user"),
        "ancestors materialize during discovery"
    );
}

#[test]
fn given_base_key_without_reference_then_text_stays_static() {
    let registry = Rc::new(PathRegistry::new());
    let text = "price: $app. end, similar $appx.y key";

    let template = Template::parse(&registry, "$app", text, "").unwrap();

    assert_eq!(template.reference_count(), 0);
    assert!(registry.is_empty());
    assert_eq!(template.render(), text);
}

#[test]
fn given_malformed_base_key_when_parsing_then_fails() {
    let registry = Rc::new(PathRegistry::new());

    let err = Template::parse(&registry, "bad key", "x", "").unwrap_err();

    assert!(matches!(err, BindError::MalformedKey { .. }));
}

// ============================================================
// Rendering Tests
// ============================================================

#[test]
fn given_unbound_template_when_rendering_then_shows_reference_text() {
    let registry = Rc::new(PathRegistry::new());
    let text = "Hello $app.user.name!";

    let template = Template::parse(&registry, "$app", text, "").unwrap();

    assert_eq!(template.render(), "Hello user.name!");
}

#[test]
fn given_bound_data_when_rendering_then_shows_current_values() {
    let registry = Rc::new(PathRegistry::new());
    let text = "Hello $app.user.name, you have $app.count new messages.";
    let template = Template::parse(&registry, "$app", text, "").unwrap();

    let scope = ReactiveScope::new(
        Rc::clone(&registry),
        data(&[
            ("user", object(&[("name", Value::from("Ada"))])),
            ("count", Value::from(3)),
        ]),
        "$app",
    )
    .unwrap();

    assert_eq!(
        template.render(),
        "Hello Ada, you have 3 new messages.",
        "bind-time push fills every fragment"
    );

    scope.child("user").unwrap().set("name", "Grace");
    scope.set("count", 4);

    assert_eq!(template.render(), "Hello Grace, you have 4 new messages.");
}

#[test]
fn given_repeated_reference_when_pushed_then_every_occurrence_updates() {
    let registry = Rc::new(PathRegistry::new());
    let template = Template::parse(&registry, "$app", "$app.v + $app.v", "").unwrap();

    let scope =
        ReactiveScope::new(Rc::clone(&registry), data(&[("v", Value::from(1))]), "$app").unwrap();
    assert_eq!(template.render(), "1 + 1");

    scope.set("v", 2);
    assert_eq!(template.render(), "2 + 2");
}

#[test]
fn given_absent_or_null_values_when_bound_then_placeholder_is_rendered() {
    let registry = Rc::new(PathRegistry::new());
    let template = Template::parse(&registry, "$app", "[$app.ghost][$app.void]", "-").unwrap();

    let _scope = ReactiveScope::new(
        Rc::clone(&registry),
        data(&[("void", Value::Null)]),
        "$app",
    )
    .unwrap();

    assert_eq!(template.render(), "[-][-]");
}

// ============================================================
// Ordering Invariant Tests
// ============================================================

#[test]
fn given_scope_built_before_discovery_then_nothing_is_instrumented() {
    let registry = Rc::new(PathRegistry::new());

    // Wrong order: the registry is empty, so the scope instruments nothing.
    let scope =
        ReactiveScope::new(Rc::clone(&registry), data(&[("v", Value::from(1))]), "$app").unwrap();
    let template = Template::parse(&registry, "$app", "v is $app.v", "").unwrap();

    scope.set("v", 2);

    assert_eq!(
        template.render(),
        "v is v",
        "references discovered after binding never receive pushes"
    );
    assert!(!scope.is_instrumented("v"));
}

// ============================================================
// File Fixture Tests
// ============================================================

#[test]
fn given_template_file_when_read_then_binds_end_to_end() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "host = $cfg.net.host:$cfg.net.port").unwrap();
    let text = std::fs::read_to_string(file.path()).unwrap();

    let registry = Rc::new(PathRegistry::new());
    let template = Template::parse(&registry, "$cfg", &text, "").unwrap();

    let _scope = ReactiveScope::new(
        Rc::clone(&registry),
        data(&[(
            "net",
            object(&[
                ("host", Value::from("localhost")),
                ("port", Value::from(8080)),
            ]),
        )]),
        "$cfg",
    )
    .unwrap();

    assert_eq!(template.render(), "host = localhost:8080");
}
