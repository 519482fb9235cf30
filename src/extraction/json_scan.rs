//! Locating a JSON object inside free-form model output

use crate::logging::log_trace;
use serde_json::{Map, Value};

/// Parse `text` into a JSON object, salvaging one embedded in prose when needed.
///
/// 1. Whole text parsed as an object
/// 2. Each `{` in order, cut at its balanced closing brace, first candidate that
///    parses to an object wins
///
/// Returns `None` when neither step produces an object.
pub(crate) fn parse_object(text: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text.trim()) {
        return Some(map);
    }

    for (start, _) in text.match_indices('{') {
        let Some(len) = balanced_object_len(&text[start..]) else {
            continue;
        };
        let candidate = &text[start..start + len];
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => {
                log_trace!(offset = start, length = len, "Found embedded JSON object");
                return Some(map);
            }
            _ => continue,
        }
    }

    None
}

/// Byte length of the balanced `{...}` span at the start of `text`.
///
/// Braces inside string literals are ignored and backslash escapes are honoured.
fn balanced_object_len(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}
