//! x402 Payment Required handshake for agent invocations.
//!
//! Implements the client side of the [x402 payment protocol](https://www.x402.org/)
//! as used by pay-per-call agent gateways:
//!
//! ```text
//! ┌──────────────┐   POST message/send    ┌──────────────┐
//! │  Invocation  │ ──────────────────────→│  Agent       │
//! │  Client      │ ←────────────────────  │  Gateway     │
//! │              │  402 Payment Required  │              │
//! │              │  (payment_requirements)│              │
//! │              │                        │              │
//! │              │  POST + X-PAYMENT hdr  │              │
//! │              │ ──────────────────────→│              │
//! │              │  200 OK + result       │              │
//! │              │ ←────────────────────  │              │
//! │              │  + X-Payment-Response  │              │
//! └──────────────┘                        └──────────────┘
//! ```
//!
//! # Components
//!
//! - **[`types`]**: wire types (payment requirements, signed payload, headers)
//! - **[`credential`]**: the signing credential and payer address derivation
//! - **[`handshake`]**: requirement selection, authorization and signing
//! - **[`evidence`]**: settlement evidence recovery (metadata, then header)
//! - **[`error`]**: typed errors
//!
//! # Usage
//!
//! ```
//! use agentcall_x402::{handshake, PaymentCredential, PaymentRequirement};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credential = PaymentCredential::from_hex(
//!     "0x1111111111111111111111111111111111111111111111111111111111111111",
//! )?;
//!
//! let requirements: Vec<PaymentRequirement> = serde_json::from_str(
//!     r#"[{"network":"base-sepolia","max_amount_required":"10000","asset":"USDC","pay_to":"0xabc"}]"#,
//! )?;
//!
//! let token = handshake(&requirements, &credential, 1)?;
//! // → send the retried request with `X-PAYMENT: token`
//! # Ok(())
//! # }
//! ```

pub mod credential;
pub mod error;
pub mod evidence;
pub mod handshake;
pub mod types;

pub use credential::PaymentCredential;
pub use error::{X402Error, X402Result};
pub use evidence::{explorer_link, SettlementEvidence};
pub use handshake::handshake;
pub use types::{
    parse_version, PaymentAuthorization, PaymentPayload, PaymentRequirement, SignedPaymentToken,
    HEADER_PAYMENT, HEADER_PAYMENT_RESPONSE, SCHEME_EXACT, X402_VERSION,
};
