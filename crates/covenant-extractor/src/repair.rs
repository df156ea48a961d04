//! Best-effort recovery of a JSON object from oracle output
//!
//! Oracles wrap JSON in markdown fences, leave trailing commas, and drop
//! commas between fields. `repair` tries a direct parse first, then a fixed
//! pipeline of textual heuristics. The missing-comma rewrite is a
//! heuristic, not a grammar fix; it can over- or under-correct on inputs
//! where a string value itself looks like a quoted key.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;
use tracing::debug;

fn fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"```[a-zA-Z0-9_]*").expect("static regex"))
}

fn trailing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r",\s*([}\]])").expect("static regex"))
}

fn missing_comma_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // A closed string value immediately followed by what looks like the
    // start of a new quoted key
    RE.get_or_init(|| Regex::new(r#""\s*("[a-zA-Z0-9_]+"\s*:)"#).expect("static regex"))
}

/// Extract the substring spanning the first `{` to the last `}`
///
/// Strips conversational preamble and postamble around the JSON body.
/// Returns None when no such bracket pair exists in order; callers then
/// pass the raw text through unchanged.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// Parse `blob` into a JSON object, repairing it if needed
///
/// Tries a direct parse, then the heuristic pipeline (strip fences, drop
/// trailing commas, insert missing commas) followed by a reparse. Returns
/// None when the payload is unrecoverable or not an object; callers must
/// substitute a fallback record.
pub fn repair(blob: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str(blob) {
        return Some(map);
    }

    let cleaned = fence_re().replace_all(blob, "");
    let cleaned = cleaned.trim();
    let cleaned = trailing_comma_re().replace_all(cleaned, "$1");
    let cleaned = missing_comma_re().replace_all(&cleaned, "\", $1");

    match serde_json::from_str(&cleaned) {
        Ok(Value::Object(map)) => Some(map),
        Ok(_) => {
            debug!("Repaired payload is valid JSON but not an object");
            None
        }
        Err(e) => {
            debug!("JSON repair failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_json_parses_directly() {
        let map = repair(r#"{"a": 1, "b": "two"}"#).unwrap();
        assert_eq!(map["a"], json!(1));
        assert_eq!(map["b"], json!("two"));
    }

    #[test]
    fn test_repair_is_idempotent_on_valid_json() {
        let original = json!({"contract_type": "nda", "parties": [{"name": "Acme"}]});
        let map = repair(&serde_json::to_string(&original).unwrap()).unwrap();
        assert_eq!(Value::Object(map), original);
    }

    #[test]
    fn test_strips_markdown_fences() {
        let map = repair("```json\n{\"a\":1}\n```").unwrap();
        assert_eq!(map["a"], json!(1));
    }

    #[test]
    fn test_strips_fences_without_language_tag() {
        let map = repair("```\n{\"a\":1}\n```").unwrap();
        assert_eq!(map["a"], json!(1));
    }

    #[test]
    fn test_removes_trailing_comma_in_object() {
        let map = repair(r#"{"a":1,}"#).unwrap();
        assert_eq!(map["a"], json!(1));
    }

    #[test]
    fn test_removes_trailing_comma_in_array() {
        let map = repair(r#"{"tags": ["x", "y",]}"#).unwrap();
        assert_eq!(map["tags"], json!(["x", "y"]));
    }

    #[test]
    fn test_inserts_missing_comma_between_fields() {
        let map = repair(r#"{"a": "one" "b": "two"}"#).unwrap();
        assert_eq!(map["a"], json!("one"));
        assert_eq!(map["b"], json!("two"));
    }

    #[test]
    fn test_unrecoverable_garbage_is_none() {
        assert!(repair("this is not json at all").is_none());
        assert!(repair("{{{{").is_none());
    }

    #[test]
    fn test_non_object_json_is_none() {
        assert!(repair("[1, 2, 3]").is_none());
        assert!(repair("\"just a string\"").is_none());
    }

    #[test]
    fn test_extract_json_object_strips_preamble() {
        let raw = "Sure! Here is the JSON you asked for:\n{\"a\": 1}\nHope that helps.";
        assert_eq!(extract_json_object(raw), Some("{\"a\": 1}"));
    }

    #[test]
    fn test_extract_json_object_keeps_largest_span() {
        let raw = "x {\"a\": {\"b\": 2}} y";
        assert_eq!(extract_json_object(raw), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn test_extract_json_object_none_without_brackets() {
        assert!(extract_json_object("no braces here").is_none());
        assert!(extract_json_object("} backwards {").is_none());
    }
}
