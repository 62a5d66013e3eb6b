//! Schema enforcement for vision-model responses.
//!
//! The model is asked for a strict JSON object but routinely wraps it in
//! markdown fences, prepends chatter, or drops fields. This module is a
//! total function over that mess: parse, schema-fix, repair, heuristic
//! fallback, terminal fallback. It always returns a well-formed
//! `AnalysisResult` and never propagates an error past its boundary.

use crate::ai::heuristic::fallback_heuristic;
use crate::models::AnalysisResult;
use serde_json::{Map, Value};

/// Default base name when the model omits one
pub const DEFAULT_FILENAME: &str = "unnamed-photo";
/// Default explanation when the model omits one
pub const DEFAULT_REASONS: &str = "No description available";
/// Default confidence when the model's value is missing or not numeric
pub const DEFAULT_CONFIDENCE: f32 = 0.5;

/// Turn one raw model response into a validated `AnalysisResult`.
///
/// `image_bytes` back the pixel-statistics fallback when the response is
/// beyond repair.
pub fn validate_response(raw_text: &str, image_bytes: &[u8]) -> AnalysisResult {
    let candidate = extract_fenced_block(raw_text).unwrap_or(raw_text);

    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(candidate.trim()) {
        return fix_schema(fields);
    }

    if let Some(fields) = attempt_repair(raw_text) {
        tracing::debug!("model response repaired from loose JSON");
        return fix_schema(fields);
    }

    tracing::warn!("model response unusable, falling back to pixel heuristic");
    fallback_heuristic(image_bytes)
}

/// Extract the content of a ```json or plain ``` fenced block, if any.
fn extract_fenced_block(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```json") {
        let body = &text[start + 7..];
        if let Some(end) = body.find("```") {
            return Some(body[..end].trim());
        }
    }

    if let Some(start) = text.find("```") {
        let body = &text[start + 3..];
        // Skip the language line of the opening fence
        let content_start = body.find('\n').map(|i| i + 1).unwrap_or(0);
        if let Some(end) = body[content_start..].find("```") {
            return Some(body[content_start..content_start + end].trim());
        }
    }

    None
}

/// Loose-JSON repair: strict decode of the substring between the first `{`
/// and the last `}` of the raw text.
fn attempt_repair(raw_text: &str) -> Option<Map<String, Value>> {
    let start = raw_text.find('{')?;
    let end = raw_text.rfind('}')?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<Value>(&raw_text[start..=end]) {
        Ok(Value::Object(fields)) => Some(fields),
        _ => None,
    }
}

/// Fill missing fields with defaults and coerce present fields to the
/// expected types.
fn fix_schema(fields: Map<String, Value>) -> AnalysisResult {
    AnalysisResult {
        proposed_filename: string_field(fields.get("proposed_filename"), DEFAULT_FILENAME),
        reasons: string_field(fields.get("reasons"), DEFAULT_REASONS),
        semantic_tags: tags_field(fields.get("semantic_tags")),
        confidence: confidence_field(fields.get("confidence")),
    }
}

fn string_field(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        // null counts as absent
        Some(Value::Null) | None => default.to_string(),
        Some(other) => other.to_string(),
    }
}

fn tags_field(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn confidence_field(value: Option<&Value>) -> f32 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(c) if c.is_finite() => (c as f32).clamp(0.0, 1.0),
        _ => DEFAULT_CONFIDENCE,
    }
}
