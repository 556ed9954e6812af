//! x402 protocol wire types.
//!
//! Covers the two sides of the handshake: the payment requirements a gateway
//! returns inside a 402 response, and the signed payment payload the client
//! sends back in the `X-PAYMENT` header.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{X402Error, X402Result};

/// x402 protocol version assumed when the gateway does not state one.
pub const X402_VERSION: u32 = 1;

/// HTTP header carrying the signed payment payload (client → gateway).
pub const HEADER_PAYMENT: &str = "X-PAYMENT";

/// HTTP header carrying settlement evidence (gateway → client).
pub const HEADER_PAYMENT_RESPONSE: &str = "X-Payment-Response";

/// The only payment scheme this client produces.
pub const SCHEME_EXACT: &str = "exact";

/// Default payment validity window in seconds when the gateway omits one.
pub const DEFAULT_MAX_TIMEOUT_SECONDS: u64 = 300;

// =============================================================================
// Payment Requirements (402 response → client)
// =============================================================================

/// A single payment requirement offered by the gateway.
///
/// Arrives as an entry of `error.data.payment_requirements` in a 402
/// response. Gateways differ in which fields they populate, so everything
/// except the core pricing fields is lenient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequirement {
    /// Payment scheme (e.g., "exact").
    #[serde(default = "default_scheme")]
    pub scheme: String,

    /// Network identifier (e.g., "base-sepolia").
    #[serde(default)]
    pub network: String,

    /// Maximum amount required, in the asset's smallest unit.
    #[serde(default)]
    pub max_amount_required: String,

    /// Asset identifier (token contract address or symbol).
    #[serde(default)]
    pub asset: String,

    /// Address to pay to.
    #[serde(default)]
    pub pay_to: String,

    /// URL of the resource being paid for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,

    /// Human-readable description of the resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Maximum time in seconds the payment is valid after creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_timeout_seconds: Option<u64>,

    /// Scheme-specific extra fields the gateway may attach.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<Value>,
}

fn default_scheme() -> String {
    SCHEME_EXACT.to_string()
}

impl PaymentRequirement {
    /// Validity window for payments against this requirement.
    pub fn timeout_seconds(&self) -> u64 {
        self.max_timeout_seconds
            .unwrap_or(DEFAULT_MAX_TIMEOUT_SECONDS)
    }
}

/// Parse the `x402_version` field of a 402 response.
///
/// Gateways send it as a string; absent or unparseable values fall back to
/// version 1.
pub fn parse_version(raw: Option<&str>) -> u32 {
    match raw.map(str::parse::<u32>) {
        Some(Ok(v)) => v,
        Some(Err(_)) => {
            tracing::warn!(raw = ?raw, "Unparseable x402_version, assuming version 1");
            X402_VERSION
        }
        None => X402_VERSION,
    }
}

// =============================================================================
// Payment Payload (client → gateway)
// =============================================================================

/// Signed payment payload carried in the `X-PAYMENT` header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    /// x402 protocol version.
    pub x402_version: u32,

    /// The payment scheme used.
    pub scheme: String,

    /// Network the payment is for.
    pub network: String,

    /// Scheme-specific payment details.
    pub payload: ExactPaymentDetails,
}

/// Details of an "exact" scheme payment: a signed authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExactPaymentDetails {
    /// Signature over the canonical authorization bytes (hex-encoded).
    pub signature: String,

    /// The authorization that was signed.
    pub authorization: PaymentAuthorization,
}

/// An unsigned payment authorization.
///
/// Binds the payer to the selected requirement's network, asset and amount
/// for a bounded validity window. The nonce is always hex-encoded text,
/// never raw bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentAuthorization {
    /// Payer's address, derived from the signing credential.
    pub from: String,

    /// Recipient's address.
    pub to: String,

    /// Payment amount in the asset's smallest unit.
    pub value: String,

    /// Asset being paid.
    pub asset: String,

    /// Network the payment settles on.
    pub network: String,

    /// Timestamp after which the payment is valid (Unix seconds).
    pub valid_after: String,

    /// Timestamp before which the payment is valid (Unix seconds).
    pub valid_before: String,

    /// Replay-protection nonce (hex-encoded 32 bytes).
    pub nonce: String,
}

impl PaymentPayload {
    /// Encode this payload to the base64 text carried in `X-PAYMENT`.
    pub fn to_header(&self) -> X402Result<String> {
        use base64::Engine as _;
        let json = serde_json::to_vec(self)
            .map_err(|e| X402Error::SigningFailure(format!("payload encode error: {}", e)))?;
        Ok(base64::engine::general_purpose::STANDARD.encode(&json))
    }

    /// Decode a payload from a base64 header value.
    pub fn from_header(header_value: &str) -> X402Result<Self> {
        use base64::Engine as _;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(header_value)
            .map_err(|e| X402Error::malformed_evidence(format!("base64 decode error: {}", e)))?;
        serde_json::from_slice(&decoded)
            .map_err(|e| X402Error::malformed_evidence(format!("JSON parse error: {}", e)))
    }
}

/// Opaque signed payment token attached to the retried request.
///
/// Single-use: minted for one invocation and dropped with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPaymentToken(String);

impl SignedPaymentToken {
    /// Wrap an already-encoded token.
    pub fn new(token: String) -> Self {
        Self(token)
    }

    /// The header value to send.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SignedPaymentToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
