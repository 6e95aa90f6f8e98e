use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wsnap operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Project root not found from {start}")]
    ProjectNotFound { start: PathBuf },

    #[error("invalid install configuration: {0}")]
    ConfigInvalid(String),

    #[error("failed to parse {path}: {message}")]
    ParseFailure { path: PathBuf, message: String },

    #[error(transparent)]
    Resolution(#[from] crate::install::resolve::ResolveError),

    #[error("bundler error: {0}")]
    BundlerError(String),

    #[error("circular dependency: {0}")]
    CircularDependency(String),

    #[error("unresolved module: {specifier}")]
    UnresolvedModule { specifier: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
