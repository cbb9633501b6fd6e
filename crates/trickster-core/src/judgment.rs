//! The judge's verdict on one player turn.

use serde::Serialize;
use serde_json::{Map, Value};

/// Scoring verdict for a completed player turn. Immutable once produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Judgment {
    /// Change to apply to suspicion (may be negative or out of range).
    pub suspicion_delta: i64,
    /// Change to apply to progress (may be negative or out of range).
    pub progress_delta: i64,
    /// The judge's explanation.
    pub reason: String,
    /// Short label for the NPC's emotional state.
    pub npc_state: String,
}

const SUSPICION_KEYS: [&str; 3] = ["suspicion_change", "suspicion_delta", "suspicionDelta"];
const PROGRESS_KEYS: [&str; 3] = ["progress_change", "progress_delta", "progressDelta"];
const NPC_STATE_KEYS: [&str; 2] = ["npc_state", "npcState"];

impl Judgment {
    /// Builds a judgment from raw response text.
    ///
    /// Never fails: text that is not a JSON object yields an all-zero
    /// judgment, and missing or non-conforming fields default to zero or
    /// empty. A surrounding Markdown code fence is tolerated.
    #[must_use]
    pub fn from_response_text(text: &str) -> Self {
        match serde_json::from_str::<Value>(strip_code_fence(text)) {
            Ok(value) => Self::from_value(&value),
            Err(_) => Self::default(),
        }
    }

    /// Builds a judgment from an already-parsed JSON value.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };

        Self {
            suspicion_delta: field(object, &SUSPICION_KEYS).map_or(0, lenient_integer),
            progress_delta: field(object, &PROGRESS_KEYS).map_or(0, lenient_integer),
            reason: field(object, &["reason"]).map(lenient_text).unwrap_or_default(),
            npc_state: field(object, &NPC_STATE_KEYS).map(lenient_text).unwrap_or_default(),
        }
    }
}

fn field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| object.get(*k))
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. "json") on the opening fence line.
    let body = body.split_once('\n').map_or(body, |(_, rest)| rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[allow(clippy::cast_possible_truncation)]
fn lenient_integer(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim().trim_start_matches('+');
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.round() as i64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn lenient_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_response_is_parsed() {
        let judgment = Judgment::from_response_text(
            r#"{"suspicion_change": -5, "progress_change": 10, "reason": "命中核心词", "npc_state": "动摇"}"#,
        );

        assert_eq!(judgment.suspicion_delta, -5);
        assert_eq!(judgment.progress_delta, 10);
        assert_eq!(judgment.reason, "命中核心词");
        assert_eq!(judgment.npc_state, "动摇");
    }

    #[test]
    fn test_unparsable_response_yields_zero_judgment() {
        assert_eq!(Judgment::from_response_text("the judge is asleep"), Judgment::default());
        assert_eq!(Judgment::from_response_text(""), Judgment::default());
        assert_eq!(Judgment::from_response_text("[1, 2, 3]"), Judgment::default());
    }

    #[test]
    fn test_missing_fields_default_to_zero_and_empty() {
        let judgment = Judgment::from_response_text(r#"{"progress_change": 25}"#);

        assert_eq!(judgment.suspicion_delta, 0);
        assert_eq!(judgment.progress_delta, 25);
        assert!(judgment.reason.is_empty());
        assert!(judgment.npc_state.is_empty());
    }

    #[test]
    fn test_non_conforming_numbers_are_coerced() {
        let judgment = Judgment::from_response_text(
            r#"{"suspicion_change": "+35", "progress_change": 12.6, "reason": null, "npc_state": 3}"#,
        );

        assert_eq!(judgment.suspicion_delta, 35);
        assert_eq!(judgment.progress_delta, 13);
        assert!(judgment.reason.is_empty());
        assert_eq!(judgment.npc_state, "3");
    }

    #[test]
    fn test_garbage_delta_defaults_to_zero() {
        let judgment =
            Judgment::from_response_text(r#"{"suspicion_change": "lots", "progress_change": true}"#);

        assert_eq!(judgment.suspicion_delta, 0);
        assert_eq!(judgment.progress_delta, 0);
    }

    #[test]
    fn test_fenced_response_is_accepted() {
        let text = "```json\n{\"suspicion_change\": 50, \"progress_change\": 0}\n```";
        let judgment = Judgment::from_response_text(text);

        assert_eq!(judgment.suspicion_delta, 50);
    }

    #[test]
    fn test_camel_case_keys_are_accepted() {
        let judgment =
            Judgment::from_response_text(r#"{"suspicionDelta": 15, "progressDelta": -3, "npcState": "暴怒"}"#);

        assert_eq!(judgment.suspicion_delta, 15);
        assert_eq!(judgment.progress_delta, -3);
        assert_eq!(judgment.npc_state, "暴怒");
    }
}
