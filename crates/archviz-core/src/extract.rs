//! Extraction of diagram specs embedded in free-form text.
//!
//! Language models often wrap the JSON they produce in prose, markdown fences
//! or an echo of the tool call they meant to make. The scanner here finds every
//! balanced top-level `{...}` region, tries to parse each one on its own, and
//! keeps going past anything that does not parse.

use log::{debug, trace};
use serde_json::{Map, Value};

/// Returns every top-level JSON value found in `text`, in order of appearance.
///
/// Candidates start at a `{` seen at depth zero and end at the matching `}`.
/// Braces inside string literals are ignored, and a backslash escapes the
/// next quote or backslash so `\"` never closes a string. Candidates that
/// fail to parse are skipped silently. A `}` with no open brace is ignored.
pub fn extract_json_objects(text: &str) -> Vec<Value> {
    let mut objects = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text.char_indices() {
        let was_escaped = std::mem::take(&mut escaped);
        match ch {
            '\\' if !was_escaped => escaped = true,
            '"' if !was_escaped => in_string = !in_string,
            _ if in_string => {}
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth > 0 {
                    continue;
                }
                if let Some(s) = start.take() {
                    let chunk = &text[s..=i];
                    match serde_json::from_str::<Value>(chunk) {
                        Ok(value) => objects.push(value),
                        Err(err) => trace!(offset = s, err:%; "Discarding malformed candidate"),
                    }
                }
            }
            _ => {}
        }
    }

    objects
}

/// Finds the first embedded object that looks like a diagram spec.
///
/// An object qualifies when it has both `nodes` and `edges` keys, or when its
/// `arguments` value (an object, or a string holding a JSON object) has both.
pub fn extract_spec(text: &str) -> Option<Map<String, Value>> {
    let spec = extract_json_objects(text)
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(obj) => Some(obj),
            _ => None,
        })
        .find_map(spec_candidate);

    debug!(found = spec.is_some(); "Scanned text for embedded spec");
    spec
}

/// Parses the argument string of a structured tool call.
///
/// Blank arguments are read as an empty object.
///
/// # Errors
///
/// Returns the JSON error when the string is not a JSON object.
pub fn parse_tool_arguments(arguments: &str) -> Result<Map<String, Value>, serde_json::Error> {
    let arguments = arguments.trim();
    if arguments.is_empty() {
        return Ok(Map::new());
    }
    serde_json::from_str(arguments)
}

fn spec_candidate(obj: Map<String, Value>) -> Option<Map<String, Value>> {
    if looks_like_spec(&obj) {
        return Some(obj);
    }
    let arguments = match obj.get("arguments")? {
        Value::String(raw) => serde_json::from_str::<Value>(raw).ok()?,
        other => other.clone(),
    };
    match arguments {
        Value::Object(args) if looks_like_spec(&args) => Some(args),
        _ => None,
    }
}

fn looks_like_spec(obj: &Map<String, Value>) -> bool {
    obj.contains_key("nodes") && obj.contains_key("edges")
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    /// Arbitrary text never makes the scanner panic, and every returned
    /// value came from a balanced region of the input.
    fn check_arbitrary_text(text: &str) -> Result<(), TestCaseError> {
        let objects = extract_json_objects(text);
        let open_braces = text.matches('{').count();
        prop_assert!(objects.len() <= open_braces);
        Ok(())
    }

    /// A spec placed after arbitrary brace-free noise is always found.
    fn check_spec_after_noise(noise: &str) -> Result<(), TestCaseError> {
        let text = format!("{noise} {{\"nodes\": [], \"edges\": []}}");
        let spec = extract_spec(&text);
        prop_assert_eq!(spec, json!({"nodes": [], "edges": []}).as_object().cloned());
        Ok(())
    }

    proptest! {
        #[test]
        fn arbitrary_text(text in "\\PC{0,200}") {
            check_arbitrary_text(&text)?;
        }

        #[test]
        fn spec_after_noise(noise in "[^{}\"\\\\]{0,100}") {
            check_spec_after_noise(&noise)?;
        }
    }
}
