//! Turn raw model text into a JSON value

use crate::LlmError;
use serde_json::Value;

/// Parse a model's text answer as JSON
///
/// Accepts bare JSON, JSON wrapped in a markdown code fence, or JSON
/// surrounded by prose (the outermost `{...}` span is tried last).
pub fn extract_json(raw: &str) -> Result<Value, LlmError> {
    let trimmed = strip_fence(raw.trim());
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(LlmError::InvalidResponse(format!(
        "model output is not valid JSON: {}",
        preview(trimmed)
    )))
}

fn strip_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag line (```json)
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn preview(text: &str) -> String {
    const MAX: usize = 200;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        let head: String = text.chars().take(MAX).collect();
        format!("{}...", head)
    }
}
