//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors from loading, validating, or resolving a `chipbench.toml`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML content is malformed or has the wrong shape.
    #[error("invalid chipbench.toml: {0}")]
    ParseError(String),

    /// A field the build needs is absent or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A value is present but unusable.
    #[error("validation error: {0}")]
    ValidationError(String),
}
