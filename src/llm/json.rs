//! JSON object extraction from free-form model replies.
//!
//! Models asked for headed text sometimes answer with a JSON object instead,
//! often inside a fenced block or surrounded by chatter. The reply parser
//! uses this as its fallback.

use serde_json::{Map, Value};

/// Find the first JSON object in `response`.
///
/// Tries a ` ```json ` fenced block, then a bare fenced block, then every
/// `{` in the text with balanced-brace scanning.
pub fn extract_json_object(response: &str) -> Option<Map<String, Value>> {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```json")
        && let Some(end) = trimmed[start + 7..].find("```")
        && let Some(object) = parse_object(&trimmed[start + 7..start + 7 + end])
    {
        return Some(object);
    }

    if let Some(start) = trimmed.find("```")
        && let Some(end) = trimmed[start + 3..].find("```")
        && let Some(object) = parse_object(&trimmed[start + 3..start + 3 + end])
    {
        return Some(object);
    }

    for (start_idx, _) in trimmed.match_indices('{') {
        let candidate = &trimmed[start_idx..];
        if let Some(object) = balanced_braces(candidate).and_then(parse_object) {
            return Some(object);
        }
    }

    None
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// The prefix of `text` up to the brace closing its first `{`.
///
/// Braces inside JSON string literals (including escaped quotes) are not
/// counted.
fn balanced_braces(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (idx, ch) in text.char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=idx]);
                }
            }
            _ => {}
        }
    }

    None
}
