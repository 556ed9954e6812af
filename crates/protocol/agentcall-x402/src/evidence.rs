//! Settlement evidence recovery.
//!
//! After a paid retry succeeds, gateways surface the on-chain transaction in
//! different places. Recovery is an ordered strategy chain, first success
//! wins:
//!
//! 1. `result.metadata.x402.payment_response` embedded in the response body
//! 2. the `X-Payment-Response` header (base64-encoded JSON)
//!
//! If neither yields a transaction the settlement is unconfirmed but not
//! failed: the call itself succeeded, there is just no hash to show.

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{X402Error, X402Result};

/// Proof that the payment settled on-chain.
#[derive(Debug, Clone, PartialEq)]
pub struct SettlementEvidence {
    /// On-chain transaction identifier.
    pub transaction: String,

    /// Network the settlement occurred on.
    pub network: Option<String>,

    /// Payer's address as reported by the gateway.
    pub payer: Option<String>,

    /// Settled amount as reported by the gateway.
    pub amount: Option<String>,
}

impl SettlementEvidence {
    /// Recover evidence from the response body and/or header.
    ///
    /// Strategies run in priority order; a metadata-embedded transaction
    /// beats a header-embedded one.
    pub fn recover(body: Option<&Value>, header: Option<&str>) -> Option<Self> {
        if let Some(evidence) = body.and_then(Self::from_result_metadata) {
            debug!(transaction = %evidence.transaction, "Settlement evidence found in response metadata");
            return Some(evidence);
        }

        if let Some(raw) = header {
            match Self::from_header_value(raw) {
                Ok(evidence) => {
                    debug!(transaction = %evidence.transaction, "Settlement evidence found in X-Payment-Response header");
                    return Some(evidence);
                }
                Err(e) => {
                    warn!(error = %e, "Could not decode X-Payment-Response header");
                }
            }
        }

        None
    }

    /// Strategy 1: `result.metadata.x402.payment_response` in the body.
    pub fn from_result_metadata(body: &Value) -> Option<Self> {
        let payment_response = body.pointer("/result/metadata/x402/payment_response")?;
        Self::from_payment_response(payment_response)
    }

    /// Strategy 2: base64-encoded JSON from the `X-Payment-Response` header.
    pub fn from_header_value(raw: &str) -> X402Result<Self> {
        use base64::Engine as _;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(raw.trim())
            .map_err(|e| X402Error::malformed_evidence(format!("base64 decode error: {}", e)))?;
        let value: Value = serde_json::from_slice(&decoded)
            .map_err(|e| X402Error::malformed_evidence(format!("JSON parse error: {}", e)))?;

        Self::from_payment_response(&value)
            .ok_or_else(|| X402Error::malformed_evidence("missing transaction field"))
    }

    /// Extract the evidence fields from a payment_response object.
    ///
    /// Requires a `transaction` value; the sibling fields are optional.
    fn from_payment_response(value: &Value) -> Option<Self> {
        let transaction = scalar_to_string(value.get("transaction")?)?;
        Some(Self {
            transaction,
            network: value.get("network").and_then(scalar_to_string),
            payer: value.get("payer").and_then(scalar_to_string),
            amount: value.get("amount").and_then(scalar_to_string),
        })
    }

    /// Explorer link for this settlement, selected by network name.
    pub fn explorer_link(&self) -> (String, String) {
        let network = self.network.as_deref().unwrap_or("unknown");
        explorer_link(network, &self.transaction)
    }
}

/// Map a network name to the matching block explorer URL and label.
pub fn explorer_link(network: &str, transaction: &str) -> (String, String) {
    let lower = network.to_lowercase();
    if lower.contains("sepolia") {
        (
            "View on Base Sepolia Explorer".to_string(),
            format!("https://sepolia.basescan.org/tx/{}", transaction),
        )
    } else if lower.contains("base") {
        (
            "View on Base Explorer".to_string(),
            format!("https://basescan.org/tx/{}", transaction),
        )
    } else {
        (
            "View on Explorer".to_string(),
            format!("https://basescan.org/tx/{}", transaction),
        )
    }
}

/// Render gateway scalars (strings or numbers) as text.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use serde_json::json;

    fn encode_header(value: &Value) -> String {
        base64::engine::general_purpose::STANDARD.encode(serde_json::to_vec(value).unwrap())
    }

    #[test]
    fn test_from_result_metadata() {
        let body = json!({
            "result": {
                "metadata": {
                    "x402": {
                        "payment_response": {
                            "transaction": "0xtx1",
                            "network": "base-sepolia",
                            "payer": "0xpayer",
                            "amount": 10000
                        }
                    }
                }
            }
        });

        let evidence = SettlementEvidence::from_result_metadata(&body).unwrap();
        assert_eq!(evidence.transaction, "0xtx1");
        assert_eq!(evidence.network.as_deref(), Some("base-sepolia"));
        assert_eq!(evidence.amount.as_deref(), Some("10000"));
    }

    #[test]
    fn test_metadata_without_transaction_is_none() {
        let body = json!({
            "result": { "metadata": { "x402": { "payment_response": { "network": "base" } } } }
        });
        assert!(SettlementEvidence::from_result_metadata(&body).is_none());
    }

    #[test]
    fn test_from_header_value() {
        let header = encode_header(&json!({
            "transaction": "0xtx2",
            "network": "base",
            "success": true
        }));

        let evidence = SettlementEvidence::from_header_value(&header).unwrap();
        assert_eq!(evidence.transaction, "0xtx2");
        assert_eq!(evidence.network.as_deref(), Some("base"));
        assert!(evidence.payer.is_none());
    }

    #[test]
    fn test_header_garbage_is_error() {
        assert!(SettlementEvidence::from_header_value("!!!").is_err());
    }

    #[test]
    fn test_metadata_wins_over_header() {
        let body = json!({
            "result": {
                "metadata": { "x402": { "payment_response": { "transaction": "0xbody" } } }
            }
        });
        let header = encode_header(&json!({ "transaction": "0xheader" }));

        let evidence = SettlementEvidence::recover(Some(&body), Some(&header)).unwrap();
        assert_eq!(evidence.transaction, "0xbody");
    }

    #[test]
    fn test_header_used_when_metadata_absent() {
        let body = json!({ "result": { "parts": [] } });
        let header = encode_header(&json!({ "transaction": "0xheader" }));

        let evidence = SettlementEvidence::recover(Some(&body), Some(&header)).unwrap();
        assert_eq!(evidence.transaction, "0xheader");
    }

    #[test]
    fn test_no_evidence_is_none() {
        let body = json!({ "result": { "parts": [] } });
        assert!(SettlementEvidence::recover(Some(&body), None).is_none());
    }

    #[test]
    fn test_explorer_link_by_network() {
        let (label, url) = explorer_link("base-sepolia", "0xabc");
        assert!(label.contains("Sepolia"));
        assert!(url.starts_with("https://sepolia.basescan.org/tx/"));

        let (label, url) = explorer_link("base", "0xabc");
        assert_eq!(label, "View on Base Explorer");
        assert!(url.starts_with("https://basescan.org/tx/"));

        let (_, url) = explorer_link("unknown", "0xabc");
        assert!(url.contains("0xabc"));
    }
}
