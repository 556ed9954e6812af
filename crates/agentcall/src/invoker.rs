//! JSON-RPC invocation with the x402 payment retry.
//!
//! One invocation is at most two HTTP exchanges: the initial POST, and a
//! single retry carrying the signed `X-PAYMENT` header if the gateway
//! answered 402 Payment Required. There is never a second retry.

use serde_json::Value;
use tracing::{debug, info, warn};

use agentcall_x402::{
    handshake, parse_version, PaymentCredential, PaymentRequirement, SettlementEvidence,
    HEADER_PAYMENT, HEADER_PAYMENT_RESPONSE,
};

use crate::error::{InvokeError, InvokeResult};
use crate::phases::{self, PhaseLog};
use crate::transport::{Transport, TransportResponse};

/// Sends one JSON-RPC envelope, handling payment if the gateway demands it.
pub struct RpcInvoker<'a> {
    transport: &'a dyn Transport,
    credential: Option<&'a PaymentCredential>,
}

impl<'a> RpcInvoker<'a> {
    pub fn new(transport: &'a dyn Transport, credential: Option<&'a PaymentCredential>) -> Self {
        Self {
            transport,
            credential,
        }
    }

    /// POST the envelope and return the JSON-RPC `result` value.
    ///
    /// Records the payment phase (pending, then confirmed or not-required)
    /// into `phases` as a side effect.
    pub async fn send(
        &self,
        endpoint: &str,
        envelope: &Value,
        phases: &mut PhaseLog,
    ) -> InvokeResult<Value> {
        let mut response = self.transport.post(endpoint, envelope, &[]).await?;

        if let Some((requirements, version)) = detect_payment_required(&response) {
            response = self
                .pay_and_retry(endpoint, envelope, &requirements, version, phases)
                .await?;
        } else {
            debug!("No payment required for this invocation");
            phases.payment_not_required();
        }

        finish(&response)
    }

    /// Sign the first payment requirement and retry the request once.
    async fn pay_and_retry(
        &self,
        endpoint: &str,
        envelope: &Value,
        requirements: &[PaymentRequirement],
        version: u32,
        phases: &mut PhaseLog,
    ) -> InvokeResult<TransportResponse> {
        let requirement = requirements.first().ok_or_else(|| {
            InvokeError::InvalidPaymentRequirements {
                reason: "402 response missing payment_requirements".to_string(),
            }
        })?;

        info!(
            network = %requirement.network,
            amount = %requirement.max_amount_required,
            version,
            "Payment required, generating X-PAYMENT header"
        );

        let credential = self.credential.ok_or_else(|| InvokeError::PaymentFailed {
            reason: "payment required but no signing credential configured".to_string(),
        })?;

        let token = handshake(requirements, credential, version)?;
        phases.payment_pending(phases::payment_pending_body(requirement, version));

        let response = self
            .transport
            .post(
                endpoint,
                envelope,
                &[(HEADER_PAYMENT.to_string(), token.as_str().to_string())],
            )
            .await?;

        if response.is_success() {
            let body = response.json();
            let evidence = SettlementEvidence::recover(
                body.as_ref(),
                response.header(HEADER_PAYMENT_RESPONSE),
            );
            match evidence {
                Some(evidence) => {
                    info!(transaction = %evidence.transaction, "X402 payment settled");
                    phases.payment_confirmed(phases::payment_confirmed_body(
                        requirement,
                        version,
                        &evidence,
                        &credential.payer_address(),
                    ));
                }
                None => {
                    warn!("Paid retry succeeded without settlement evidence");
                    phases.payment_unconfirmed();
                }
            }
        }

        Ok(response)
    }
}

/// Decide whether a response demands payment, and parse the requirements.
///
/// Triggers on HTTP 402, or on a `payment_requirements` key inside
/// `error.data` regardless of status (some gateways answer 200 with a
/// JSON-RPC payment error).
fn detect_payment_required(
    response: &TransportResponse,
) -> Option<(Vec<PaymentRequirement>, u32)> {
    let body = response.json();
    let data = body
        .as_ref()
        .and_then(|b| b.pointer("/error/data"));

    let has_requirements_key = data
        .and_then(|d| d.get("payment_requirements"))
        .is_some();
    if response.status != 402 && !has_requirements_key {
        return None;
    }

    let requirements = data
        .and_then(|d| d.get("payment_requirements"))
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();
    let version = parse_version(
        data.and_then(|d| d.get("x402_version"))
            .and_then(Value::as_str),
    );

    Some((requirements, version))
}

/// Turn the final transport response into the JSON-RPC `result`, or a typed
/// error.
fn finish(response: &TransportResponse) -> InvokeResult<Value> {
    if response.status == 402 {
        // Post-retry 402: the signed payment was rejected at settlement.
        let reason = response
            .json()
            .as_ref()
            .and_then(|b| b.pointer("/error/message"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| "payment was not accepted by the gateway".to_string());
        return Err(InvokeError::PaymentFailed { reason });
    }

    if !response.is_success() {
        return Err(InvokeError::HttpStatus {
            status: response.status,
        });
    }

    let body = response.json().ok_or_else(|| InvokeError::InvalidResponse {
        reason: "response body is not valid JSON".to_string(),
    })?;

    if let Some(error) = body.get("error") {
        return Err(InvokeError::Rpc {
            code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }

    body.get("result")
        .cloned()
        .ok_or_else(|| InvokeError::InvalidResponse {
            reason: "response missing result field".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: Value) -> TransportResponse {
        TransportResponse {
            status,
            headers: vec![],
            body: body.to_string(),
        }
    }

    #[test]
    fn test_detect_on_402_status() {
        let r = response(
            402,
            json!({
                "error": {
                    "code": -32000,
                    "data": {
                        "x402_version": "1",
                        "payment_requirements": [
                            {"network": "base-sepolia", "max_amount_required": "10", "asset": "USDC", "pay_to": "0xabc"}
                        ]
                    }
                }
            }),
        );

        let (requirements, version) = detect_payment_required(&r).unwrap();
        assert_eq!(requirements.len(), 1);
        assert_eq!(requirements[0].network, "base-sepolia");
        assert_eq!(version, 1);
    }

    #[test]
    fn test_detect_on_requirements_key_with_200() {
        let r = response(
            200,
            json!({
                "error": { "data": { "payment_requirements": [] } }
            }),
        );

        let (requirements, _) = detect_payment_required(&r).unwrap();
        assert!(requirements.is_empty());
    }

    #[test]
    fn test_no_detection_without_402_or_key() {
        let r = response(200, json!({ "result": { "parts": [] } }));
        assert!(detect_payment_required(&r).is_none());

        let r = response(500, json!({ "error": { "message": "boom" } }));
        assert!(detect_payment_required(&r).is_none());
    }

    #[test]
    fn test_unparseable_version_defaults_to_one() {
        let r = response(
            402,
            json!({
                "error": { "data": { "x402_version": "two", "payment_requirements": [{}] } }
            }),
        );

        let (_, version) = detect_payment_required(&r).unwrap();
        assert_eq!(version, 1);
    }

    #[test]
    fn test_finish_extracts_result() {
        let r = response(200, json!({ "result": { "parts": [1] } }));
        let result = finish(&r).unwrap();
        assert_eq!(result["parts"][0], 1);
    }

    #[test]
    fn test_finish_rpc_error() {
        let r = response(200, json!({ "error": { "code": -32601, "message": "no method" } }));
        let err = finish(&r).unwrap_err();
        assert!(matches!(err, InvokeError::Rpc { code: -32601, .. }));
    }

    #[test]
    fn test_finish_post_retry_402_is_payment_failure() {
        let r = response(402, json!({ "error": { "message": "insufficient balance" } }));
        let err = finish(&r).unwrap_err();
        match err {
            InvokeError::PaymentFailed { reason } => {
                assert!(reason.contains("insufficient balance"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_finish_http_error() {
        let r = response(503, json!({}));
        assert!(matches!(
            finish(&r).unwrap_err(),
            InvokeError::HttpStatus { status: 503 }
        ));
    }

    #[test]
    fn test_finish_missing_result() {
        let r = response(200, json!({ "jsonrpc": "2.0" }));
        assert!(matches!(
            finish(&r).unwrap_err(),
            InvokeError::InvalidResponse { .. }
        ));
    }

    #[test]
    fn test_finish_non_json_body() {
        let r = TransportResponse {
            status: 200,
            headers: vec![],
            body: "<html>gateway error</html>".to_string(),
        };
        assert!(matches!(
            finish(&r).unwrap_err(),
            InvokeError::InvalidResponse { .. }
        ));
    }
}
