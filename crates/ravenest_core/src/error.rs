//! Error types for the validation engine.
//!
//! Content problems are never errors here: they are recorded as
//! [`Issue`](crate::issue::Issue) values. This type only covers failures of
//! the surrounding infrastructure (missing directories, unreadable trees).

use thiserror::Error;

/// Result type alias using [`LintError`].
pub type Result<T> = std::result::Result<T, LintError>;

/// Top-level error type for infrastructure failures during a lint run.
#[derive(Debug, Error)]
pub enum LintError {
    /// The config directory does not exist.
    #[error("Config directory not found: {0}")]
    ConfigDirNotFound(String),

    /// Failed to read a file or directory.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path that could not be read.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The images tree could not be walked.
    #[error("Failed to scan images directory '{path}': {source}")]
    ImagesDirUnreadable {
        /// Root of the images tree.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl LintError {
    /// Wrap an IO error with the path that produced it.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
