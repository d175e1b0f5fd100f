//! Error types for the filter bar.
//!
//! Rendering never fails: stale ids, inconsistent scope partitions and
//! missing measurements are recovered where they occur. These errors cover
//! the operations outside the render path.

use std::path::PathBuf;

use crate::item::FilterId;

/// Result type alias for filter bar operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside the render path.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Panel configuration could not be parsed.
    #[error("Invalid panel configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Panel configuration file could not be read.
    #[error("Failed to read panel configuration '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A selection was reported for a filter the panel does not hold.
    #[error("Unknown filter '{0}'")]
    UnknownFilter(FilterId),
}

impl Error {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
