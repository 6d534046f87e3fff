//! Error types for repository analysis

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The configuration file exists but is malformed or violates a
    /// constraint. Fatal: raised before any traversal starts.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// The analysis root itself could not be processed. Per-file failures
    /// are logged and skipped instead of raising this.
    #[error("analysis failed: {message}")]
    Analysis { message: String },
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    pub fn analysis(message: impl Into<String>) -> Self {
        Error::Analysis {
            message: message.into(),
        }
    }
}
