//! Invocation audit trail ("phases").
//!
//! Each invocation accumulates an ordered sequence of human-readable phases
//! that reconstruct what happened, serialized as the `jsonValue` audit blob.
//! Timestamps are presentation offsets from "now" (a plausible timeline for
//! the audit log, not measured durations).
//!
//! The payment phase is a dedicated slot entry that is mutated in place when
//! settlement evidence arrives. Only the slot can change state, so the
//! "replace the wrong phase" bug cannot happen.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use agentcall_registry::AgentRecord;
use agentcall_x402::{PaymentRequirement, SettlementEvidence};

use crate::extract::ResearchOutcome;
use crate::request::TimeframeConfig;

/// Presentation offsets (minutes from now) per phase role.
pub const OFFSET_DISCOVERY: i64 = -16;
pub const OFFSET_REQUEST: i64 = -12;
pub const OFFSET_PAYMENT: i64 = -10;
pub const OFFSET_RESULT: i64 = -8;
pub const OFFSET_VALIDATION: i64 = -7;
pub const OFFSET_FAILURE: i64 = -6;

/// Phase titles.
pub const TITLE_DISCOVERY: &str = "Discover research agent";
pub const TITLE_REQUEST: &str = "Call A2A endpoint using JSON-RPC 2.0";
pub const TITLE_PAYMENT_PENDING: &str = "Generate X402 payment header";
pub const TITLE_PAYMENT_CONFIRMED: &str = "X402 payment confirmed";
pub const TITLE_PAYMENT_NOT_REQUIRED: &str = "X402 payment check (not required)";
pub const TITLE_RESULT: &str = "Retrieve research report";
pub const TITLE_VALIDATION: &str = "Safety check passed";
pub const TITLE_FAILURE: &str = "Safety check failed";

/// One rendered audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    /// Phase title (without numbering).
    pub title: String,

    /// Markdown-formatted content.
    pub markdown_content: String,

    /// ISO-8601 UTC timestamp.
    pub timestamp: String,
}

/// The payment slot's lifecycle.
#[derive(Debug, Clone)]
enum PaymentSlot {
    /// No 402 was encountered.
    NotRequired,
    /// Signature generated, settlement evidence not seen yet.
    Pending { body: String },
    /// Retry succeeded but the gateway surfaced no transaction hash.
    Unconfirmed { body: String },
    /// Settlement evidence recovered.
    Confirmed { body: String },
}

impl PaymentSlot {
    fn title(&self) -> &'static str {
        match self {
            Self::NotRequired => TITLE_PAYMENT_NOT_REQUIRED,
            Self::Pending { .. } | Self::Unconfirmed { .. } => TITLE_PAYMENT_PENDING,
            Self::Confirmed { .. } => TITLE_PAYMENT_CONFIRMED,
        }
    }

    fn body(&self) -> String {
        match self {
            Self::NotRequired => "## X402 Payment\n\n\
                 ### Payment Status\n\
                 - **Status**: Not required\n\
                 - **Result**: Free request\n"
                .to_string(),
            Self::Pending { body } | Self::Unconfirmed { body } | Self::Confirmed { body } => {
                body.clone()
            }
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Plain {
        title: String,
        body: String,
        offset_minutes: i64,
    },
    Payment(PaymentSlot),
}

/// Append-only phase log with a single mutable payment slot.
#[derive(Debug, Clone, Default)]
pub struct PhaseLog {
    entries: Vec<Entry>,
}

impl PhaseLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append a plain phase.
    pub fn push(&mut self, title: impl Into<String>, body: impl Into<String>, offset_minutes: i64) {
        self.entries.push(Entry::Plain {
            title: title.into(),
            body: body.into(),
            offset_minutes,
        });
    }

    /// Record the optimistic "signature generated" payment phase.
    pub fn payment_pending(&mut self, body: String) {
        debug_assert!(self.payment_slot().is_none(), "payment slot already recorded");
        self.entries.push(Entry::Payment(PaymentSlot::Pending { body }));
    }

    /// Record that no payment was required for this invocation.
    pub fn payment_not_required(&mut self) {
        debug_assert!(self.payment_slot().is_none(), "payment slot already recorded");
        self.entries.push(Entry::Payment(PaymentSlot::NotRequired));
    }

    /// Supersede the pending payment phase with a confirmed one.
    ///
    /// Mutates the slot in place; at most one payment phase ever renders.
    pub fn payment_confirmed(&mut self, body: String) {
        if let Some(slot) = self.payment_slot() {
            *slot = PaymentSlot::Confirmed { body };
        } else {
            debug_assert!(false, "payment confirmation without a pending payment phase");
        }
    }

    /// Mark the payment as accepted by the gateway without a transaction hash.
    pub fn payment_unconfirmed(&mut self) {
        if let Some(slot) = self.payment_slot() {
            if let PaymentSlot::Pending { body } = slot {
                let body = format!(
                    "{}- **Settlement**: Confirmed by gateway acceptance, transaction hash unavailable\n",
                    body
                );
                *slot = PaymentSlot::Unconfirmed { body };
            }
        }
    }

    /// Append the terminal failure phase.
    pub fn fail(&mut self, code: &str, message: &str) {
        self.push(TITLE_FAILURE, failure_body(code, message), OFFSET_FAILURE);
    }

    /// Render the phases with timestamps relative to now.
    pub fn render(&self) -> Vec<Phase> {
        let now = Utc::now();
        self.entries
            .iter()
            .map(|entry| {
                let (title, body, offset) = match entry {
                    Entry::Plain {
                        title,
                        body,
                        offset_minutes,
                    } => (title.clone(), body.clone(), *offset_minutes),
                    Entry::Payment(slot) => {
                        (slot.title().to_string(), slot.body(), OFFSET_PAYMENT)
                    }
                };
                Phase {
                    title,
                    markdown_content: body,
                    timestamp: (now + Duration::minutes(offset))
                        .format("%Y-%m-%dT%H:%M:%S%.6fZ")
                        .to_string(),
                }
            })
            .collect()
    }

    /// Serialize the audit blob: `{"phases":[...]}` plus an optional
    /// `errorReason`.
    pub fn json_value(&self, error_reason: Option<&str>) -> String {
        let mut value = json!({ "phases": self.render() });
        if let Some(reason) = error_reason {
            value["errorReason"] = json!(reason);
        }
        value.to_string()
    }

    fn payment_slot(&mut self) -> Option<&mut PaymentSlot> {
        self.entries.iter_mut().find_map(|entry| match entry {
            Entry::Payment(slot) => Some(slot),
            _ => None,
        })
    }
}

// =============================================================================
// Markdown bodies
// =============================================================================

/// Discovery phase content.
pub fn discovery_body(agent: &AgentRecord) -> String {
    format!(
        "## Agent Discovery\n\n\
         ### Registry Query\n\
         - **Agent ID**: `{}`\n\
         - **Status**: Successfully discovered\n\n\
         ### Agent Info\n\
         ```yaml\n\
         name: {}\n\
         endpoint: {}\n\
         x402_support: {}\n\
         structured_output: {}\n\
         ```\n",
        agent.agent_id, agent.name, agent.endpoint, agent.x402_support, agent.structured_output
    )
}

/// Request phase content.
pub fn request_body(symbol: &str, trade_date: &str, timeframes: &TimeframeConfig) -> String {
    let timeframes_json =
        serde_json::to_string(timeframes).unwrap_or_else(|_| "{}".to_string());
    format!(
        "## JSON-RPC Request\n\n\
         ### Query Parameters\n\
         ```yaml\n\
         symbol: {}\n\
         trade_date: {}\n\
         timeframes: {}\n\
         ```\n\n\
         ### Request\n\
         - **Method**: message/send\n\
         - **Protocol**: JSON-RPC 2.0\n",
        symbol, trade_date, timeframes_json
    )
}

/// Optimistic payment phase content (signature generated, not yet settled).
pub fn payment_pending_body(requirement: &PaymentRequirement, version: u32) -> String {
    format!(
        "## X402 Payment\n\n\
         ### Payment Details\n\
         ```yaml\n\
         network: {}\n\
         amount: {}\n\
         asset: {}\n\
         ```\n\n\
         - **Version**: X402 v{}\n\
         - **Status**: Signature generated\n",
        display_or_na(&requirement.network),
        display_or_na(&requirement.max_amount_required),
        display_or_na(&requirement.asset),
        version
    )
}

/// Confirmed payment phase content with settlement evidence.
pub fn payment_confirmed_body(
    requirement: &PaymentRequirement,
    version: u32,
    evidence: &SettlementEvidence,
    payer: &str,
) -> String {
    let network = evidence
        .network
        .clone()
        .unwrap_or_else(|| display_or_na(&requirement.network));
    let amount = evidence
        .amount
        .clone()
        .unwrap_or_else(|| display_or_na(&requirement.max_amount_required));
    let payer = evidence.payer.as_deref().unwrap_or(payer);
    let (explorer_text, explorer_url) = evidence.explorer_link();

    format!(
        "## X402 Payment\n\n\
         ### Payment Details\n\
         ```yaml\n\
         network: {}\n\
         amount: {}\n\
         asset: {}\n\
         payer: {}\n\
         ```\n\n\
         - **Version**: X402 v{}\n\
         - **Status**: Payment confirmed\n\
         - **Transaction**: `{}`\n\
         - **Explorer**: [{}]({})\n",
        network,
        amount,
        display_or_na(&requirement.asset),
        payer,
        version,
        evidence.transaction,
        explorer_text,
        explorer_url
    )
}

/// Result phase content.
pub fn result_body(symbol: &str, outcome: &ResearchOutcome) -> String {
    format!(
        "## Research Report\n\n\
         ### Response Data\n\
         ```yaml\n\
         symbol: {}\n\
         confidence: {:.2}\n\
         summary: {}\n\
         report: {}\n\
         ```\n\n\
         - **Status**: Data received\n",
        symbol, outcome.confidence, outcome.research_summary, outcome.research_report
    )
}

/// Validation phase content.
pub fn validation_body() -> String {
    "## Safety Check\n\n\
     ### Validation Results\n\
     - Response format valid\n\
     - Data integrity confirmed\n\
     - Content verified\n\n\
     **Status**: Passed\n"
        .to_string()
}

fn failure_body(code: &str, message: &str) -> String {
    format!(
        "## Safety Check Failed\n\n\
         ### Error Details\n\
         ```\n\
         Error Code: {}\n\
         Description: {}\n\
         ```\n\n\
         **Status**: Failed\n",
        code, message
    )
}

fn display_or_na(value: &str) -> String {
    if value.is_empty() {
        "N/A".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requirement() -> PaymentRequirement {
        serde_json::from_value(json!({
            "network": "base-sepolia",
            "max_amount_required": "10000",
            "asset": "USDC",
            "pay_to": "0xabc"
        }))
        .unwrap()
    }

    fn evidence() -> SettlementEvidence {
        SettlementEvidence {
            transaction: "0xdeadbeef".to_string(),
            network: Some("base-sepolia".to_string()),
            payer: Some("0xpayer".to_string()),
            amount: Some("10000".to_string()),
        }
    }

    #[test]
    fn test_push_and_render_preserves_order() {
        let mut log = PhaseLog::new();
        log.push("first", "body1", OFFSET_DISCOVERY);
        log.push("second", "body2", OFFSET_REQUEST);

        let phases = log.render();
        assert_eq!(phases.len(), 2);
        assert_eq!(phases[0].title, "first");
        assert_eq!(phases[1].title, "second");
        assert!(phases[0].timestamp <= phases[1].timestamp);
    }

    #[test]
    fn test_timestamps_end_with_z() {
        let mut log = PhaseLog::new();
        log.push("t", "b", OFFSET_RESULT);
        let phases = log.render();
        assert!(phases[0].timestamp.ends_with('Z'));
        assert!(phases[0].timestamp.contains('T'));
    }

    #[test]
    fn test_payment_slot_confirmation_replaces_in_place() {
        let mut log = PhaseLog::new();
        log.push("discovery", "d", OFFSET_DISCOVERY);
        log.payment_pending(payment_pending_body(&requirement(), 1));
        log.push("result", "r", OFFSET_RESULT);

        log.payment_confirmed(payment_confirmed_body(&requirement(), 1, &evidence(), "0xme"));

        let phases = log.render();
        assert_eq!(phases.len(), 3);
        let payment_phases: Vec<_> = phases
            .iter()
            .filter(|p| p.title.contains("payment"))
            .collect();
        assert_eq!(payment_phases.len(), 1);
        assert_eq!(payment_phases[0].title, TITLE_PAYMENT_CONFIRMED);
        assert!(payment_phases[0].markdown_content.contains("0xdeadbeef"));
        // Slot keeps its position between discovery and result.
        assert_eq!(phases[1].title, TITLE_PAYMENT_CONFIRMED);
    }

    #[test]
    fn test_confirmation_never_touches_other_phases() {
        let mut log = PhaseLog::new();
        log.payment_pending("pending".to_string());
        log.push("later", "untouched", OFFSET_RESULT);

        log.payment_confirmed("confirmed".to_string());

        let phases = log.render();
        assert_eq!(phases[1].title, "later");
        assert_eq!(phases[1].markdown_content, "untouched");
    }

    #[test]
    fn test_payment_unconfirmed_keeps_pending_title() {
        let mut log = PhaseLog::new();
        log.payment_pending(payment_pending_body(&requirement(), 1));
        log.payment_unconfirmed();

        let phases = log.render();
        assert_eq!(phases[0].title, TITLE_PAYMENT_PENDING);
        assert!(phases[0]
            .markdown_content
            .contains("transaction hash unavailable"));
    }

    #[test]
    fn test_payment_not_required_phase() {
        let mut log = PhaseLog::new();
        log.payment_not_required();

        let phases = log.render();
        assert_eq!(phases[0].title, TITLE_PAYMENT_NOT_REQUIRED);
        assert!(phases[0].markdown_content.contains("Not required"));
    }

    #[test]
    fn test_json_value_shape() {
        let mut log = PhaseLog::new();
        log.push("t", "b", OFFSET_DISCOVERY);

        let blob: serde_json::Value = serde_json::from_str(&log.json_value(None)).unwrap();
        assert_eq!(blob["phases"][0]["title"], "t");
        assert_eq!(blob["phases"][0]["markdownContent"], "b");
        assert!(blob.get("errorReason").is_none());

        let blob: serde_json::Value =
            serde_json::from_str(&log.json_value(Some("UNKNOWN_ERROR: boom"))).unwrap();
        assert_eq!(blob["errorReason"], "UNKNOWN_ERROR: boom");
    }

    #[test]
    fn test_failure_phase() {
        let mut log = PhaseLog::new();
        log.push("t", "b", OFFSET_DISCOVERY);
        log.fail("CONNECTION_ERROR", "Network error, unable to access A2A endpoint");

        let phases = log.render();
        let last = phases.last().unwrap();
        assert_eq!(last.title, TITLE_FAILURE);
        assert!(last.markdown_content.contains("CONNECTION_ERROR"));
    }

    #[test]
    fn test_offsets_produce_non_decreasing_timeline() {
        let mut log = PhaseLog::new();
        log.push(TITLE_DISCOVERY, "d", OFFSET_DISCOVERY);
        log.push(TITLE_REQUEST, "r", OFFSET_REQUEST);
        log.payment_pending("p".to_string());
        log.push(TITLE_RESULT, "res", OFFSET_RESULT);
        log.push(TITLE_VALIDATION, "v", OFFSET_VALIDATION);

        let phases = log.render();
        for pair in phases.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }
}
