//! Session error types.

use shipval_catalog::ConfigurationError;
use shipval_normalize::TableError;
use shipval_schema::SchemaError;
use thiserror::Error;

/// Errors in `shipval.toml` itself.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {path}")]
    FileNotFound { path: String },

    #[error("Config parse error in {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("Config validation failed for {field}: {message}")]
    ValidationFailed { field: String, message: String },
}

impl ConfigError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Session errors. All of them occur before a run starts.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("table error: {0}")]
    Table(#[from] TableError),

    #[error("catalog error: {0}")]
    Catalog(#[from] ConfigurationError),

    #[error("invalid run input: {0}")]
    Input(String),

    #[error("invalid run transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl SessionError {
    pub fn read(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Read {
            path: path.display().to_string(),
            source,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
