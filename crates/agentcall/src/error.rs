//! Typed error taxonomy for agent invocations.
//!
//! Every component returns a variant of [`InvokeError`] directly; the wire
//! error code is a total function on the enum, so classification never
//! depends on scanning message text.

use thiserror::Error;

use agentcall_x402::X402Error;

/// Result type for invocation operations.
pub type InvokeResult<T> = Result<T, InvokeError>;

/// Errors that can occur during one agent invocation.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// Discovery yielded zero usable records.
    #[error("no agent found for query: {query}")]
    AgentNotFound {
        /// The agent id that was looked up, or "any"
        query: String,
    },

    /// No registry endpoint was configured.
    #[error("registry client not configured")]
    RegistryNotConfigured,

    /// The 402 response carried no usable payment requirements.
    #[error("invalid payment requirements: {reason}")]
    InvalidPaymentRequirements {
        /// Description of what's wrong
        reason: String,
    },

    /// The payment handshake or its settlement failed.
    #[error("x402 payment failed: {reason}")]
    PaymentFailed {
        /// Reason for failure
        reason: String,
    },

    /// Network failure reaching the agent endpoint (including timeouts).
    #[error("connection error: {reason}")]
    Connection {
        /// Reason for failure
        reason: String,
    },

    /// The endpoint returned a non-402 error status.
    #[error("agent endpoint returned HTTP {status}")]
    HttpStatus {
        /// The HTTP status code
        status: u16,
    },

    /// The response body carried a JSON-RPC error object.
    #[error("agent returned error: {message} (code: {code})")]
    Rpc {
        /// JSON-RPC error code
        code: i64,
        /// JSON-RPC error message
        message: String,
    },

    /// The response body was not a well-formed success response.
    #[error("invalid response from agent: {reason}")]
    InvalidResponse {
        /// Description of what's wrong
        reason: String,
    },

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl InvokeError {
    /// The wire error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidPaymentRequirements { .. } | Self::PaymentFailed { .. } => {
                ErrorCode::PaymentFailed
            }
            Self::Connection { .. } => ErrorCode::Connection,
            Self::AgentNotFound { .. } => ErrorCode::AgentNotFound,
            Self::RegistryNotConfigured => ErrorCode::NotConfigured,
            Self::HttpStatus { .. }
            | Self::Rpc { .. }
            | Self::InvalidResponse { .. }
            | Self::Internal(_) => ErrorCode::Unknown,
        }
    }

    /// Human-readable summary used in failure phases and result summaries.
    pub fn user_message(&self) -> String {
        match self.code() {
            ErrorCode::Unknown => self.to_string(),
            code => code.description().to_string(),
        }
    }
}

impl From<X402Error> for InvokeError {
    fn from(e: X402Error) -> Self {
        match e {
            X402Error::InvalidRequirements { reason } => {
                Self::InvalidPaymentRequirements { reason }
            }
            X402Error::SigningFailure(reason) => Self::PaymentFailed { reason },
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Closed set of wire error codes carried in failure results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Payment handshake or settlement failure
    PaymentFailed,
    /// Network failure
    Connection,
    /// Discovery found nothing
    AgentNotFound,
    /// Registry client never configured
    NotConfigured,
    /// Anything else
    Unknown,
}

impl ErrorCode {
    /// The wire string for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentFailed => "X402_PAYMENT_FAILED",
            Self::Connection => "CONNECTION_ERROR",
            Self::AgentNotFound => "AGENT_NOT_FOUND",
            Self::NotConfigured => "SDK_NOT_INITIALIZED",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Friendly description shown to users.
    pub fn description(&self) -> &'static str {
        match self {
            Self::PaymentFailed => "Payment failed - signature expired or insufficient balance",
            Self::Connection => "Network error, unable to access A2A endpoint",
            Self::AgentNotFound => "Agent not found in registry",
            Self::NotConfigured => "Registry client not configured",
            Self::Unknown => "Unexpected error during agent invocation",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
