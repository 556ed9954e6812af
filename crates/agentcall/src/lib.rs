//! Client for invoking remote research agents over the A2A JSON-RPC
//! protocol, with registry-based discovery and x402 pay-per-call support.
//!
//! One invocation is a pipeline:
//!
//! 1. **Discovery** — resolve the target agent through the registry
//!    ([`agentcall_registry`]), by explicit id or auto-selection.
//! 2. **Envelope** — wrap the structured query in a JSON-RPC
//!    `message/send` request.
//! 3. **Exchange** — POST to the agent endpoint; if the gateway answers
//!    402 Payment Required, sign the payment and retry once
//!    ([`agentcall_x402`]).
//! 4. **Extraction** — fold the response parts into a typed
//!    [`ResearchOutcome`].
//! 5. **Audit** — record a human-readable phase trail of the whole run.
//!
//! The entry point never fails: [`AgentInvoker::invoke`] returns an
//! [`InvocationResult`] that carries either the research data or a typed
//! error code, plus the audit trail in both cases.
//!
//! # Example
//!
//! ```no_run
//! use agentcall::{AgentInvoker, InvocationRequest, InvokerConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = InvokerConfig::with_registry("https://registry.example/v1")
//!     .with_wallet_key("0x...")
//!     .with_agent_id("research-1");
//!
//! let invoker = AgentInvoker::new(config)?;
//! let result = invoker.invoke(&InvocationRequest::new("BTCUSDT")).await;
//!
//! if result.is_failure() {
//!     eprintln!("{}: {}", result.error_type.unwrap(), result.error.unwrap());
//! } else {
//!     println!("confidence {}: {}", result.confidence, result.research_summary);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod facade;
pub mod invoker;
pub mod phases;
pub mod request;
pub mod transport;

pub use config::InvokerConfig;
pub use envelope::{build_envelope, Envelope, METHOD_MESSAGE_SEND};
pub use error::{ErrorCode, InvokeError, InvokeResult};
pub use extract::{extract_outcome, ResearchOutcome};
pub use facade::{AgentInvoker, InvocationResult};
pub use phases::{Phase, PhaseLog};
pub use request::{InvocationRequest, TimeframeConfig};
pub use transport::{HttpTransport, Transport, TransportResponse};

// Re-export the protocol crates' key types for single-import consumers.
pub use agentcall_registry::{AgentRecord, Directory, Discovery, RegistryClient};
pub use agentcall_x402::{PaymentCredential, PaymentRequirement, SettlementEvidence};
