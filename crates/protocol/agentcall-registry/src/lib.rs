//! Agent directory discovery client.
//!
//! Resolves an opaque agent identifier (or "any") to concrete agent records
//! with invocation endpoints and capability flags. Lookup failures come back
//! as an empty [`Discovery`] carrying an error descriptor instead of an
//! `Err`, so callers can classify them without catching.
//!
//! # Usage
//!
//! ```rust,no_run
//! use agentcall_registry::{Directory, RegistryClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = RegistryClient::new("https://registry.example/v1")?;
//!
//! // Specific agent
//! let discovery = registry.resolve(Some("42")).await;
//!
//! // Any active agent; the caller uses the first
//! let discovery = registry.resolve(None).await;
//! if let Some(agent) = discovery.first() {
//!     println!("invoking {} at {}", agent.name, agent.endpoint);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::{Directory, RegistryClient};
pub use error::{RegistryError, RegistryResult};
pub use types::{AgentRecord, Discovery};
