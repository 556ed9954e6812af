//! JSON-RPC invocation envelope.
//!
//! Wire shape (A2A `message/send`):
//!
//! ```json
//! {
//!   "jsonrpc": "2.0",
//!   "id": "<uuid>",
//!   "method": "message/send",
//!   "params": {
//!     "message": {
//!       "messageId": "<uuid>",
//!       "role": "user",
//!       "parts": [{ "type": "text", "text": "<json-encoded payload>" }]
//!     }
//!   }
//! }
//! ```

use serde_json::{json, Value};
use uuid::Uuid;

/// JSON-RPC method for agent invocations.
pub const METHOD_MESSAGE_SEND: &str = "message/send";

/// A built invocation envelope and its generated identifiers.
#[derive(Debug, Clone)]
pub struct Envelope {
    /// The full JSON-RPC request object.
    pub request: Value,

    /// JSON-RPC request id.
    pub request_id: String,

    /// A2A message id.
    pub message_id: String,
}

/// Build a `message/send` envelope around a query payload.
///
/// The payload is JSON-encoded into a single text part. Ids are fresh v4
/// UUIDs per invocation.
pub fn build_envelope(payload: &Value) -> Envelope {
    let request_id = Uuid::new_v4().to_string();
    let message_id = Uuid::new_v4().to_string();

    let request = json!({
        "jsonrpc": "2.0",
        "id": request_id,
        "method": METHOD_MESSAGE_SEND,
        "params": {
            "message": {
                "messageId": message_id,
                "role": "user",
                "parts": [
                    {
                        "type": "text",
                        "text": payload.to_string()
                    }
                ]
            }
        }
    });

    Envelope {
        request,
        request_id,
        message_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let payload = json!({"symbol": "BTCUSDT"});
        let envelope = build_envelope(&payload);

        let request = &envelope.request;
        assert_eq!(request["jsonrpc"], "2.0");
        assert_eq!(request["method"], METHOD_MESSAGE_SEND);
        assert_eq!(request["id"], envelope.request_id.as_str());

        let message = &request["params"]["message"];
        assert_eq!(message["messageId"], envelope.message_id.as_str());
        assert_eq!(message["role"], "user");
        assert_eq!(message["parts"][0]["type"], "text");
    }

    #[test]
    fn test_payload_is_json_encoded_text() {
        let payload = json!({"symbol": "BTCUSDT", "trade_date": "2026-01-01 00:00:00"});
        let envelope = build_envelope(&payload);

        let text = envelope.request["params"]["message"]["parts"][0]["text"]
            .as_str()
            .unwrap();
        let decoded: Value = serde_json::from_str(text).unwrap();
        assert_eq!(decoded["symbol"], "BTCUSDT");
    }

    #[test]
    fn test_ids_are_unique_per_envelope() {
        let payload = json!({});
        let a = build_envelope(&payload);
        let b = build_envelope(&payload);
        assert_ne!(a.request_id, b.request_id);
        assert_ne!(a.message_id, b.message_id);
        assert_ne!(a.request_id, a.message_id);
    }
}
