//! Error types for backhaul-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from loading and validating a backup plan.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse plan at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A plan file was named explicitly but does not exist.
    #[error("plan file not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// The plan parsed but fails a sanity check.
    #[error("invalid plan: {reason}")]
    InvalidPlan { reason: String },
}
