//! Error types for blacked-core
//!
//! Provides a unified error type for every stage of the query pipeline:
//! credential loading, remote calls, name resolution, CLI usage and export.

/// Result type alias for blacked operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for blacked operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Credential file exists but does not have the expected shape
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any failure reported by (or while talking to) the Shodan API
    #[error("Shodan API error: {0}")]
    RemoteService(String),

    /// Host name of a URL could not be resolved to an address
    #[error("Failed to resolve {host}: {reason}")]
    Resolution { host: String, reason: String },

    /// No query mode was selected on the command line
    #[error("{0}")]
    Usage(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// JSON encoding/decoding error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV encoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Builds a resolution error for `host`
    pub fn resolution(host: impl Into<String>, reason: impl ToString) -> Self {
        Self::Resolution {
            host: host.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Transport failures degrade exactly like API-reported failures.
        Self::RemoteService(err.without_url().to_string())
    }
}
