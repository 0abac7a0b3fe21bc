//! Error surface for provisioning, systemctl control, and the backup runner.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum InstallError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("required tool '{binary}' not found on PATH")]
    MissingDependency { binary: &'static str },

    #[error("systemctl error: {0}")]
    Systemctl(String),

    #[error("account lookup failed: {0}")]
    Lookup(String),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> InstallError {
    InstallError::Io {
        path: path.into(),
        source,
    }
}
