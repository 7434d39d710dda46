//! CLI-level errors (wraps engine errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::errors::BindError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Bind(#[from] BindError),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid data file {path}: {message}")]
    DataFormat { path: PathBuf, message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Bind(_) | CliError::DataFormat { .. } => crate::exitcode::DATAERR,
            CliError::Io { .. } => crate::exitcode::NOINPUT,
            CliError::Config { .. } => crate::exitcode::CONFIG,
        }
    }
}
