//! Key grammar: dotted identifier paths addressing observable values.
//!
//! A key is a non-empty sequence of non-empty segments drawn from
//! `[A-Za-z0-9_$]`, joined by `.`. The `$` is admitted because default base
//! keys use a `$`-prefixed sentinel name that cannot collide with data
//! properties.

use crate::errors::{BindError, BindResult};

/// Validate `key` against the identifier grammar.
///
/// Rejects empty keys, foreign characters (the usual symptom of a sloppy
/// upstream pattern match capturing whitespace or punctuation), and empty
/// segments such as `"a..b"` or a trailing dot.
pub fn validate(key: &str) -> BindResult<()> {
    let charset_ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.');

    if !charset_ok || key.split('.').any(str::is_empty) {
        return Err(BindError::MalformedKey {
            key: key.to_string(),
        });
    }
    Ok(())
}

/// Join a base key and a segment into a child key, validating the result.
pub fn make_key(base: &str, name: &str) -> BindResult<String> {
    let key = format!("{base}.{name}");
    validate(&key)?;
    Ok(key)
}

/// The final segment of a key (`"name"` for `"app.user.name"`).
pub fn last_segment(key: &str) -> &str {
    key.rsplit('.').next().unwrap_or(key)
}

/// The key with its final segment stripped; `None` for single-segment keys.
pub fn parent_of(key: &str) -> Option<&str> {
    key.rfind('.').map(|dot| &key[..dot])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("x")]
    #[case("a.b.c")]
    #[case("$base.ok_1")]
    #[case("UPPER.lower.Mixed_09")]
    fn given_valid_key_when_validating_then_accepts(#[case] key: &str) {
        assert!(validate(key).is_ok(), "{key} should be valid");
    }

    #[rstest]
    #[case("")]
    #[case("bad key!")]
    #[case("semi;colon")]
    #[case("a..b")]
    #[case(".a")]
    #[case("a.")]
    #[case("tab\there")]
    fn given_malformed_key_when_validating_then_rejects(#[case] key: &str) {
        assert!(
            matches!(validate(key), Err(BindError::MalformedKey { .. })),
            "{key:?} should be rejected"
        );
    }

    #[test]
    fn given_base_and_name_when_making_key_then_joins_with_dot() {
        assert_eq!(make_key("$app.user", "name").unwrap(), "$app.user.name");
        assert!(make_key("$app", "bad name").is_err());
    }

    #[test]
    fn given_dotted_key_when_splitting_then_segment_helpers_agree() {
        assert_eq!(last_segment("a.b.c"), "c");
        assert_eq!(parent_of("a.b.c"), Some("a.b"));
        assert_eq!(last_segment("a"), "a");
        assert_eq!(parent_of("a"), None);
    }
}
