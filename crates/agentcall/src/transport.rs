//! HTTP transport seam.
//!
//! The invoker talks to agent endpoints through the [`Transport`] trait:
//! a reqwest implementation for production, a scripted implementation for
//! tests. Responses keep their status, headers and raw body so the payment
//! layer can inspect 402 bodies and settlement headers.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{InvokeError, InvokeResult};

/// A transport-level response: status, headers and raw body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,

    /// Response headers as received.
    pub headers: Vec<(String, String)>,

    /// Raw response body.
    pub body: String,
}

impl TransportResponse {
    /// Parse the body as JSON, if it is JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Look up a header by name, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// True for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstraction over the HTTP exchange with an agent endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a JSON body with additional headers, returning the raw response.
    ///
    /// Error statuses are returned as responses, not errors; only transport
    /// failures (connect, timeout) produce an `Err`.
    async fn post(
        &self,
        url: &str,
        body: &Value,
        headers: &[(String, String)],
    ) -> InvokeResult<TransportResponse>;
}

/// reqwest-backed transport with a bounded timeout.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the given request timeout.
    pub fn new(timeout: Duration) -> InvokeResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            InvokeError::Internal(format!("failed to create HTTP client: {}", e))
        })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        body: &Value,
        headers: &[(String, String)],
    ) -> InvokeResult<TransportResponse> {
        let mut request = self.client.post(url).json(body);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.text().await.map_err(map_reqwest_error)?;

        debug!(url = %url, status, "Received transport response");

        Ok(TransportResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport").finish()
    }
}

fn map_reqwest_error(e: reqwest::Error) -> InvokeError {
    let reason = if e.is_timeout() {
        format!("request timed out: {}", e)
    } else if e.is_connect() {
        format!("failed to connect: {}", e)
    } else {
        e.to_string()
    };
    InvokeError::Connection { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_headers(headers: Vec<(String, String)>) -> TransportResponse {
        TransportResponse {
            status: 200,
            headers,
            body: r#"{"result": {}}"#.to_string(),
        }
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let response = response_with_headers(vec![(
            "x-payment-response".to_string(),
            "abc".to_string(),
        )]);
        assert_eq!(response.header("X-Payment-Response"), Some("abc"));
        assert_eq!(response.header("X-PAYMENT-RESPONSE"), Some("abc"));
        assert_eq!(response.header("X-Other"), None);
    }

    #[test]
    fn test_json_parsing() {
        let response = response_with_headers(vec![]);
        assert!(response.json().is_some());

        let broken = TransportResponse {
            status: 200,
            headers: vec![],
            body: "not json".to_string(),
        };
        assert!(broken.json().is_none());
    }

    #[test]
    fn test_is_success() {
        let mut response = response_with_headers(vec![]);
        assert!(response.is_success());
        response.status = 402;
        assert!(!response.is_success());
        response.status = 500;
        assert!(!response.is_success());
    }
}
