//! The invocation facade.
//!
//! [`AgentInvoker`] ties the pieces together: directory discovery, envelope
//! construction, the paid JSON-RPC exchange, extraction, and the audit
//! trail. Its [`invoke`](AgentInvoker::invoke) entry point is total: every
//! failure becomes a structured [`InvocationResult`] carrying the wire error
//! code, never a panic or a raw `Err`.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use agentcall_registry::{Directory, RegistryClient};
use agentcall_x402::PaymentCredential;

use crate::config::InvokerConfig;
use crate::envelope::build_envelope;
use crate::error::{InvokeError, InvokeResult};
use crate::extract::{extract_outcome, ResearchOutcome};
use crate::invoker::RpcInvoker;
use crate::phases::{
    self, PhaseLog, OFFSET_DISCOVERY, OFFSET_REQUEST, OFFSET_RESULT, OFFSET_VALIDATION,
    TITLE_DISCOVERY, TITLE_REQUEST, TITLE_RESULT, TITLE_VALIDATION,
};
use crate::request::InvocationRequest;
use crate::transport::{HttpTransport, Transport};

/// Invokes remote research agents over JSON-RPC with x402 payment support.
pub struct AgentInvoker {
    config: InvokerConfig,
    transport: Arc<dyn Transport>,
    registry: Option<Arc<dyn Directory>>,
    credential: Option<PaymentCredential>,
}

impl AgentInvoker {
    /// Build an invoker from configuration, wiring up the HTTP transport,
    /// the registry client and the payment credential.
    pub fn new(config: InvokerConfig) -> InvokeResult<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.rpc_timeout_secs))?;

        let registry: Option<Arc<dyn Directory>> = match config.registry_url.as_deref() {
            Some(url) => {
                let client = RegistryClient::new(url)
                    .map_err(|e| InvokeError::Internal(e.to_string()))?;
                Some(Arc::new(client))
            }
            None => None,
        };

        let credential = match config.wallet_private_key.as_deref() {
            Some(key) => Some(PaymentCredential::from_hex(key)?),
            None => None,
        };

        Ok(Self {
            config,
            transport: Arc::new(transport),
            registry,
            credential,
        })
    }

    /// Build an invoker from explicit components.
    pub fn with_components(
        config: InvokerConfig,
        transport: Arc<dyn Transport>,
        registry: Option<Arc<dyn Directory>>,
        credential: Option<PaymentCredential>,
    ) -> Self {
        Self {
            config,
            transport,
            registry,
            credential,
        }
    }

    /// Invoke a research agent.
    ///
    /// Never fails: errors are folded into the result's `error`/`error_type`
    /// fields, and the audit trail gets a terminal failure phase (unless
    /// nothing at all was recorded, e.g. when no registry is configured).
    pub async fn invoke(&self, request: &InvocationRequest) -> InvocationResult {
        let mut phases = PhaseLog::new();

        match self.run(request, &mut phases).await {
            Ok(outcome) => {
                info!(symbol = %request.symbol, confidence = outcome.confidence, "Agent invocation succeeded");
                InvocationResult::success(outcome, phases.json_value(None))
            }
            Err(e) => {
                let code = e.code();
                let message = e.user_message();
                warn!(symbol = %request.symbol, code = %code, error = %e, "Agent invocation failed");

                if !phases.is_empty() {
                    phases.fail(code.as_str(), &message);
                }
                let reason = format!("{}: {}", code.as_str(), message);
                let summary = format!("Research agent error ({}): {}", code.as_str(), e);

                InvocationResult::failure(
                    code.as_str(),
                    message,
                    summary,
                    phases.json_value(Some(&reason)),
                )
            }
        }
    }

    async fn run(
        &self,
        request: &InvocationRequest,
        phases: &mut PhaseLog,
    ) -> InvokeResult<ResearchOutcome> {
        let registry = self
            .registry
            .as_ref()
            .ok_or(InvokeError::RegistryNotConfigured)?;

        let agent_query = request
            .agent_id
            .as_deref()
            .or(self.config.agent_id.as_deref());

        let discovery = registry.resolve(agent_query).await;
        if let Some(error) = &discovery.error {
            warn!(error = %error, "Agent discovery reported an error");
        }
        let agent = discovery
            .first()
            .cloned()
            .ok_or_else(|| InvokeError::AgentNotFound {
                query: agent_query.unwrap_or("any").to_string(),
            })?;
        info!(agent_id = %agent.agent_id, endpoint = %agent.endpoint, "Discovered research agent");

        phases.push(
            TITLE_DISCOVERY,
            phases::discovery_body(&agent),
            OFFSET_DISCOVERY,
        );

        let trade_date = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
        let payload = request.query_payload(&trade_date);
        let envelope = build_envelope(&payload);

        phases.push(
            TITLE_REQUEST,
            phases::request_body(&request.symbol, &trade_date, &request.timeframes),
            OFFSET_REQUEST,
        );

        let invoker = RpcInvoker::new(self.transport.as_ref(), self.credential.as_ref());
        let result = invoker.send(&agent.endpoint, &envelope.request, phases).await?;

        let outcome = extract_outcome(&result);

        phases.push(
            TITLE_RESULT,
            phases::result_body(&request.symbol, &outcome),
            OFFSET_RESULT,
        );
        phases.push(TITLE_VALIDATION, phases::validation_body(), OFFSET_VALIDATION);

        Ok(outcome)
    }
}

impl std::fmt::Debug for AgentInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentInvoker")
            .field("config", &self.config)
            .field("registry", &self.registry.is_some())
            .field("credential", &self.credential.is_some())
            .finish()
    }
}

/// The structured outcome of one invocation, success or failure.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationResult {
    /// Full research report text; empty on failure.
    pub research_report: String,

    /// Summary of the findings, or an error summary on failure.
    pub research_summary: String,

    /// Agent-reported confidence; 0.0 on failure.
    pub confidence: f64,

    /// Friendly error description, present only on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Wire error code, present only on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    /// Serialized audit trail: `{"phases": [...]}` plus `errorReason` on
    /// failure.
    #[serde(rename = "jsonValue")]
    pub json_value: String,

    /// Extra fields the agent returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl InvocationResult {
    fn success(outcome: ResearchOutcome, json_value: String) -> Self {
        Self {
            research_report: outcome.research_report,
            research_summary: outcome.research_summary,
            confidence: outcome.confidence,
            error: None,
            error_type: None,
            json_value,
            extra: outcome.extra,
        }
    }

    fn failure(code: &str, error: String, summary: String, json_value: String) -> Self {
        Self {
            research_report: String::new(),
            research_summary: summary,
            confidence: 0.0,
            error: Some(error),
            error_type: Some(code.to_string()),
            json_value,
            extra: Map::new(),
        }
    }

    /// True when the invocation failed.
    pub fn is_failure(&self) -> bool {
        self.error_type.is_some()
    }
}
