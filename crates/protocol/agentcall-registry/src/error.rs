//! Error types for registry lookups.

use thiserror::Error;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur while querying the agent directory.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Network/HTTP error reaching the directory.
    #[error("registry communication error: {0}")]
    Network(String),

    /// The directory returned an error status.
    #[error("registry returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body (may be empty)
        body: String,
    },

    /// The directory response could not be parsed.
    #[error("invalid registry response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for RegistryError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RegistryError::Status {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "registry returned 500: boom");
    }
}
