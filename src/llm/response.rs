//! Turning a model reply into a [`BridgeCommand`].
//!
//! Models wrap their JSON in prose, quote numbers, invent intent spellings
//! and drop fields.  [`command_from_reply`] accepts all of that and either
//! produces a canonical command or says why it could not.

use serde_json::{Map, Value};

use crate::command::{normalize_intent, normalize_target, BridgeCommand, Department};
use crate::llm::LlmError;

/// Confidence assumed when a reply has none, or one that is not a number.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Pull a JSON object out of `reply`.
///
/// The whole reply is tried first; failing that, the span from the first
/// `{` to the last `}`.
///
/// ```
/// use bridge_ai::llm::extract_json;
///
/// let map = extract_json("Sure! {\"intent\":\"stop\"} Hope that helps.").unwrap();
/// assert_eq!(map["intent"], "stop");
/// assert!(extract_json("no json here").is_none());
/// ```
pub fn extract_json(reply: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(reply.trim()) {
        return Some(map);
    }

    let start = reply.find('{')?;
    let end = reply.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&reply[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Read a float out of a JSON number or numeric string.
fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

/// Coerce the `confidence` field to a float.
///
/// Missing, `null` or unparseable values give [`DEFAULT_CONFIDENCE`].  An
/// explicit `0` stays `0`.
pub fn coerce_confidence(value: Option<&Value>) -> f64 {
    value
        .and_then(as_number)
        .filter(|c| c.is_finite())
        .unwrap_or(DEFAULT_CONFIDENCE)
}

fn non_empty_str<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
}

/// Build a command from an extracted reply object.
///
/// Order of checks:
/// 1. confidence below `threshold` → [`LlmError::LowConfidence`];
/// 2. intent missing or unknown → [`LlmError::Rejected`];
/// 3. department unknown → [`LlmError::Rejected`]; missing → the intent's
///    default department;
/// 4. target normalized through the alias table; numbers coerced.
///
/// Range checks are left to [`validate`](crate::command::validate).
pub fn command_from_reply(
    map: &Map<String, Value>,
    threshold: f64,
) -> Result<BridgeCommand, LlmError> {
    let confidence = coerce_confidence(map.get("confidence"));
    if confidence < threshold {
        return Err(LlmError::LowConfidence {
            confidence,
            threshold,
        });
    }

    let raw_intent = non_empty_str(map, "intent")
        .ok_or_else(|| LlmError::Rejected("reply has no intent".into()))?;
    let intent = normalize_intent(raw_intent)
        .ok_or_else(|| LlmError::Rejected(format!("unknown intent '{raw_intent}'")))?;

    let mut command = BridgeCommand::new(intent);

    if let Some(raw) = non_empty_str(map, "department") {
        let department: Department = raw
            .parse()
            .map_err(|_| LlmError::Rejected(format!("unknown department '{raw}'")))?;
        command.department = department;
    }

    command.target = non_empty_str(map, "target").map(normalize_target);
    command.warp_factor = map.get("warp_factor").and_then(as_number);
    command.impulse_percent = map.get("impulse_percent").and_then(as_number);
    command.maneuver = non_empty_str(map, "maneuver").map(str::to_string);

    log::debug!("LLM reply accepted (confidence {confidence:.2}): {command}");
    Ok(command)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
