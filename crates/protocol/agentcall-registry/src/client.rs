//! HTTP directory client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::types::{AgentRecord, Discovery};

/// Default HTTP timeout for directory requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Abstraction over the agent directory.
///
/// Allows a real HTTP implementation for production and a fixed in-memory
/// implementation for testing.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolve an agent id to its record(s).
    ///
    /// With an explicit id: zero or one result. Without: all known active
    /// records (the caller auto-selects the first). Failures are reported in
    /// the returned [`Discovery`], never raised.
    async fn resolve(&self, agent_id: Option<&str>) -> Discovery;
}

/// Client for an HTTP agent directory.
#[derive(Clone)]
pub struct RegistryClient {
    /// HTTP client
    client: Client,
    /// Base URL of the directory
    base_url: String,
}

impl RegistryClient {
    /// Create a new directory client.
    pub fn new(registry_url: &str) -> RegistryResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| RegistryError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: registry_url.trim_end_matches('/').to_string(),
        })
    }

    /// Get the directory's base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up a single agent by id.
    async fn lookup_one(&self, agent_id: &str) -> RegistryResult<AgentRecord> {
        let url = format!("{}/agents/{}", self.base_url, agent_id);
        debug!(url = %url, "Looking up agent record");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Status { status, body });
        }

        response
            .json::<AgentRecord>()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))
    }

    /// Look up all active agents.
    async fn lookup_active(&self) -> RegistryResult<Vec<AgentRecord>> {
        let url = format!("{}/agents?active=true", self.base_url);
        debug!(url = %url, "Listing active agents");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(RegistryError::Status { status, body });
        }

        let listing: AgentListing = response
            .json()
            .await
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        // Directories are not obligated to honor the filter.
        let mut agents = listing.agents;
        agents.retain(|a| a.active);
        Ok(agents)
    }
}

/// Wire shape of the directory's listing endpoint.
#[derive(serde::Deserialize)]
struct AgentListing {
    #[serde(default)]
    agents: Vec<AgentRecord>,
}

#[async_trait]
impl Directory for RegistryClient {
    async fn resolve(&self, agent_id: Option<&str>) -> Discovery {
        let result = match agent_id {
            Some(id) => {
                debug!(agent_id = %id, "Resolving specific agent");
                self.lookup_one(id).await.map(|record| vec![record])
            }
            None => {
                debug!("Resolving active agents (auto-select)");
                self.lookup_active().await
            }
        };

        match result {
            Ok(agents) => {
                info!(count = agents.len(), "Directory lookup succeeded");
                Discovery::found(agents)
            }
            Err(e) => {
                warn!(error = %e, "Directory lookup failed");
                Discovery::failed(e.to_string())
            }
        }
    }
}

impl std::fmt::Debug for RegistryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = RegistryClient::new("https://registry.example/v1");
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url(), "https://registry.example/v1");
    }

    #[test]
    fn test_client_url_normalization() {
        let client = RegistryClient::new("https://registry.example/v1/").unwrap();
        assert_eq!(client.base_url(), "https://registry.example/v1");
    }

    #[test]
    fn test_client_debug() {
        let client = RegistryClient::new("https://registry.example/v1").unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("registry.example"));
    }
}
