//! Directory record types.

use serde::{Deserialize, Serialize};

/// A resolved agent record.
///
/// Immutable once resolved; owned by the caller for the duration of one
/// invocation and never cached here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Opaque agent identifier in the directory.
    pub agent_id: String,

    /// Display name.
    pub name: String,

    /// Invocation endpoint (JSON-RPC over HTTP).
    pub endpoint: String,

    /// Whether the agent accepts x402 payments.
    #[serde(default)]
    pub x402_support: bool,

    /// Whether the agent returns structured (data-part) output.
    #[serde(default)]
    pub structured_output: bool,

    /// Whether the agent is currently active.
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

/// Outcome of a directory query.
///
/// Lookup failures are reported as an empty list with an error descriptor
/// rather than an `Err`, so the caller can classify them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discovery {
    /// Number of agents found.
    pub count: usize,

    /// The resolved records.
    pub agents: Vec<AgentRecord>,

    /// Error descriptor when the lookup failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Discovery {
    /// A successful lookup.
    pub fn found(agents: Vec<AgentRecord>) -> Self {
        Self {
            count: agents.len(),
            agents,
            error: None,
        }
    }

    /// A failed lookup.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            count: 0,
            agents: Vec::new(),
            error: Some(error.into()),
        }
    }

    /// True when the lookup produced no usable records.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// The auto-select policy: the first resolved record.
    pub fn first(&self) -> Option<&AgentRecord> {
        self.agents.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_record_lenient_flags() {
        let record: AgentRecord = serde_json::from_str(
            r#"{"agent_id":"42","name":"Research","endpoint":"https://agent.example/rpc"}"#,
        )
        .unwrap();
        assert!(record.active);
        assert!(!record.x402_support);
    }

    #[test]
    fn test_discovery_found() {
        let record: AgentRecord = serde_json::from_str(
            r#"{"agent_id":"42","name":"Research","endpoint":"https://agent.example/rpc"}"#,
        )
        .unwrap();
        let discovery = Discovery::found(vec![record]);
        assert_eq!(discovery.count, 1);
        assert!(discovery.error.is_none());
        assert_eq!(discovery.first().unwrap().agent_id, "42");
    }

    #[test]
    fn test_discovery_failed() {
        let discovery = Discovery::failed("directory unreachable");
        assert_eq!(discovery.count, 0);
        assert!(discovery.is_empty());
        assert_eq!(discovery.error.as_deref(), Some("directory unreachable"));
    }
}
