//! Response extraction.
//!
//! Agents return their findings as A2A message parts: structured `data`
//! parts and/or `text` parts whose text may itself be JSON. Extraction
//! folds every part into one typed [`ResearchOutcome`], later parts
//! overriding earlier ones field by field.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// The typed outcome of a research invocation.
///
/// Fields the agent did not provide keep their defaults; anything beyond
/// the known fields is preserved in `extra` and flattened back out on
/// serialization.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    /// Full research report text.
    pub research_report: String,

    /// One-line summary of the findings.
    pub research_summary: String,

    /// Agent-reported confidence, clamped to [0.0, 1.0].
    pub confidence: f64,

    /// Fields the agent returned that have no typed slot.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ResearchOutcome {
    fn default() -> Self {
        Self {
            research_report: String::new(),
            research_summary: String::new(),
            confidence: 0.0,
            extra: Map::new(),
        }
    }
}

/// Fold the parts of a JSON-RPC `result` into a [`ResearchOutcome`].
///
/// - `data` parts merge their object directly.
/// - `text` parts are parsed as JSON; a JSON object merges like a data
///   part, any other JSON value is ignored, and non-JSON text becomes the
///   summary if no summary has been set yet.
///
/// Parts are processed in order, so later structured fields win.
pub fn extract_outcome(result: &Value) -> ResearchOutcome {
    let mut outcome = ResearchOutcome::default();

    let parts = result
        .get("parts")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);

    for part in parts {
        match part_kind(part) {
            Some("text") => {
                let Some(text) = part.get("text").and_then(Value::as_str) else {
                    continue;
                };
                match serde_json::from_str::<Value>(text) {
                    Ok(Value::Object(object)) => merge_object(&mut outcome, &object),
                    Ok(_) => {
                        debug!("Ignoring text part with non-object JSON");
                    }
                    Err(_) => {
                        if outcome.research_summary.is_empty() {
                            outcome.research_summary = text.to_string();
                        }
                    }
                }
            }
            Some("data") => {
                if let Some(object) = part.get("data").and_then(Value::as_object) {
                    merge_object(&mut outcome, object);
                }
            }
            _ => {}
        }
    }

    outcome
}

/// Part discriminator: some gateways tag parts with `kind`, others `type`.
fn part_kind(part: &Value) -> Option<&str> {
    part.get("kind")
        .or_else(|| part.get("type"))
        .and_then(Value::as_str)
}

fn merge_object(outcome: &mut ResearchOutcome, object: &Map<String, Value>) {
    for (key, value) in object {
        match key.as_str() {
            "research_report" => outcome.research_report = value_to_text(value),
            "research_summary" => outcome.research_summary = value_to_text(value),
            "confidence" => {
                if let Some(confidence) = value_to_confidence(value) {
                    outcome.confidence = confidence.clamp(0.0, 1.0);
                } else {
                    outcome.extra.insert(key.clone(), value.clone());
                }
            }
            _ => {
                outcome.extra.insert(key.clone(), value.clone());
            }
        }
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn value_to_confidence(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
