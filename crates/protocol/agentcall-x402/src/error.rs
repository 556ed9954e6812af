//! Error types for the x402 payment handshake.

use thiserror::Error;

/// Result type for x402 operations.
pub type X402Result<T> = Result<T, X402Error>;

/// Errors that can occur while preparing or decoding x402 payments.
#[derive(Debug, Error)]
pub enum X402Error {
    /// The 402 response carried no usable payment requirements.
    #[error("invalid payment requirements: {reason}")]
    InvalidRequirements {
        /// Description of what's wrong
        reason: String,
    },

    /// The signing credential is malformed.
    #[error("invalid payment credential: {reason}")]
    InvalidCredential {
        /// Description of what's wrong
        reason: String,
    },

    /// The cryptographic signing step failed.
    #[error("payment signing failed: {0}")]
    SigningFailure(String),

    /// A settlement evidence header or body could not be decoded.
    #[error("malformed settlement evidence: {reason}")]
    MalformedEvidence {
        /// Description of what's wrong
        reason: String,
    },
}

impl X402Error {
    /// Shorthand for an `InvalidRequirements` error.
    pub fn invalid_requirements(reason: impl Into<String>) -> Self {
        Self::InvalidRequirements {
            reason: reason.into(),
        }
    }

    /// Shorthand for a `MalformedEvidence` error.
    pub fn malformed_evidence(reason: impl Into<String>) -> Self {
        Self::MalformedEvidence {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = X402Error::invalid_requirements("empty list");
        assert_eq!(
            err.to_string(),
            "invalid payment requirements: empty list"
        );

        let err = X402Error::SigningFailure("bad key".to_string());
        assert!(err.to_string().contains("bad key"));
    }
}
