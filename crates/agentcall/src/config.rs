//! Invoker configuration.

use serde::Deserialize;

/// Default timeout for agent endpoint requests, in seconds.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 120;

/// Configuration for an [`AgentInvoker`](crate::AgentInvoker).
///
/// All connectivity is explicit here; there is no ambient/global state.
/// The wallet key is write-only from the outside: `Debug` redacts it.
#[derive(Clone, Deserialize)]
pub struct InvokerConfig {
    /// Base URL of the agent registry. Without it, discovery-based
    /// invocations fail with a not-configured error.
    #[serde(default)]
    pub registry_url: Option<String>,

    /// Hex-encoded payment signing key (with or without a `0x` prefix).
    /// Without it, paid invocations fail at the 402 handshake.
    #[serde(default)]
    pub wallet_private_key: Option<String>,

    /// Default agent id to invoke when a request does not name one.
    #[serde(default)]
    pub agent_id: Option<String>,

    /// Timeout for requests to agent endpoints, in seconds.
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
}

fn default_rpc_timeout_secs() -> u64 {
    DEFAULT_RPC_TIMEOUT_SECS
}

impl Default for InvokerConfig {
    fn default() -> Self {
        Self {
            registry_url: None,
            wallet_private_key: None,
            agent_id: None,
            rpc_timeout_secs: DEFAULT_RPC_TIMEOUT_SECS,
        }
    }
}

impl InvokerConfig {
    /// Configuration with a registry and no payment credential.
    pub fn with_registry(registry_url: impl Into<String>) -> Self {
        Self {
            registry_url: Some(registry_url.into()),
            ..Self::default()
        }
    }

    /// Set the payment signing key.
    pub fn with_wallet_key(mut self, key: impl Into<String>) -> Self {
        self.wallet_private_key = Some(key.into());
        self
    }

    /// Set the default agent id.
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }
}

impl std::fmt::Debug for InvokerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvokerConfig")
            .field("registry_url", &self.registry_url)
            .field(
                "wallet_private_key",
                &self.wallet_private_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("agent_id", &self.agent_id)
            .field("rpc_timeout_secs", &self.rpc_timeout_secs)
            .finish()
    }
}
