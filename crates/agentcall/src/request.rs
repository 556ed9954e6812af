//! Invocation request and timeframe configuration.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

/// Market timeframe configuration carried in the query payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeframeConfig {
    /// Primary analysis interval.
    #[serde(default = "default_primary")]
    pub primary: String,

    /// Secondary confirmation intervals.
    #[serde(default = "default_secondary")]
    pub secondary: Vec<String>,
}

fn default_primary() -> String {
    "1h".to_string()
}

fn default_secondary() -> Vec<String> {
    vec!["5m".to_string(), "15m".to_string()]
}

impl Default for TimeframeConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            secondary: default_secondary(),
        }
    }
}

impl TimeframeConfig {
    /// Parse a timeframe configuration from caller input.
    ///
    /// Accepts a JSON object like `{"primary":"1h","secondary":["5m","15m"]}`.
    /// A string that is not valid JSON is treated as the primary interval;
    /// absent input yields the defaults.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => Self::default(),
            Some(s) => serde_json::from_str(s).unwrap_or_else(|_| {
                debug!(raw = %s, "Timeframes not valid JSON, treating as primary interval");
                Self {
                    primary: s.to_string(),
                    secondary: default_secondary(),
                }
            }),
        }
    }
}

/// One invocation request: the subject, its timeframes, and an optional
/// agent override. Immutable once built.
#[derive(Debug, Clone)]
pub struct InvocationRequest {
    /// Trading symbol to research (e.g., "BTCUSDT").
    pub symbol: String,

    /// Timeframe configuration for the query payload.
    pub timeframes: TimeframeConfig,

    /// Invoke this specific agent instead of the configured/auto-selected one.
    pub agent_id: Option<String>,
}

impl InvocationRequest {
    /// Request research for a symbol with default timeframes.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframes: TimeframeConfig::default(),
            agent_id: None,
        }
    }

    /// Set the timeframe configuration.
    pub fn with_timeframes(mut self, timeframes: TimeframeConfig) -> Self {
        self.timeframes = timeframes;
        self
    }

    /// Target a specific agent id.
    pub fn with_agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Build the structured query payload sent in the envelope's text part.
    pub fn query_payload(&self, trade_date: &str) -> Value {
        json!({
            "symbol": self.symbol,
            "trade_date": trade_date,
            "market_timeframes": self.timeframes,
        })
    }
}
