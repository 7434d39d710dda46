//! Engine-level errors (no CLI concerns)

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BindError {
    #[error("malformed key: {key:?} (expected dot-separated [A-Za-z0-9_$] segments)")]
    MalformedKey { key: String },

    #[error("unsupported value in {path}: {reason}")]
    UnsupportedValue { path: String, reason: String },
}

pub type BindResult<T> = Result<T, BindError>;
