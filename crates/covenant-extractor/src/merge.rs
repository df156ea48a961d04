//! Merge engine for partial extraction records
//!
//! Operates purely on untyped JSON trees; typed conversion happens at the
//! orchestrator boundary. The fold is order-sensitive: "first non-empty
//! wins" for scalars and "first occurrence wins" for dedup, so merge input
//! order must equal chunk order.

use serde_json::map::Entry;
use serde_json::{Map, Value};
use std::collections::HashSet;
use tracing::debug;

/// Whether a value counts as empty for merge purposes
///
/// Empty values never overwrite or seed accumulator state: null, `[]`,
/// `{}`, `""`, and numeric zero.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Value::Bool(_) => false,
    }
}

/// Python-style truthiness, used for the clause `present` flag
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        other => !is_empty(other),
    }
}

/// Canonical serialization with recursively sorted object keys
///
/// Two values are duplicates iff their canonical forms are identical.
fn canonical_key(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let body: Vec<String> = keys
                .iter()
                .map(|k| format!("{}:{}", Value::String((*k).clone()), canonical_key(&map[*k])))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical_key).collect();
            format!("[{}]", body.join(","))
        }
        other => other.to_string(),
    }
}

/// Remove structural duplicates from a list, preserving first-seen order
fn dedup_values(items: Vec<Value>) -> Vec<Value> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(canonical_key(&item)) {
            out.push(item);
        }
    }
    out
}

/// Deduplicate party entries by lower-cased trimmed name
///
/// Entries with an empty name are dropped; otherwise the first occurrence
/// of each name is kept, in order.
fn dedup_parties(parties: &mut Vec<Value>) {
    let mut seen = HashSet::new();
    parties.retain(|party| {
        let key = party
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_lowercase();
        !key.is_empty() && seen.insert(key)
    });
}

/// Deduplicate clause entries by (lower-cased trimmed name, present flag)
///
/// The same clause name can appear twice when chunks disagree about its
/// presence; only exact (name, present) repeats collapse.
fn dedup_clauses(clauses: &mut Vec<Value>) {
    let mut seen = HashSet::new();
    clauses.retain(|clause| {
        let name = clause
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_lowercase();
        let present = clause.get("present").map(truthy).unwrap_or(false);
        seen.insert((name, present))
    });
}

/// Final-pass dedup for the `parties` and `clauses` lists of a record
fn postprocess_record(record: &mut Map<String, Value>) {
    if let Some(Value::Array(parties)) = record.get_mut("parties") {
        dedup_parties(parties);
    }
    if let Some(Value::Array(clauses)) = record.get_mut("clauses") {
        dedup_clauses(clauses);
    }
}

/// Merge an ordered sequence of partial records into one
///
/// Left-to-right fold. Empty incoming values are skipped; an absent or
/// empty accumulator slot takes the incoming value verbatim; two arrays
/// concatenate and dedup structurally; two objects union, with non-empty
/// incoming entries overwriting. Any other non-empty pairing keeps the
/// existing value and drops the incoming one.
pub fn merge_records(records: &[Map<String, Value>]) -> Map<String, Value> {
    let mut result = Map::new();

    for record in records {
        for (key, incoming) in record {
            if is_empty(incoming) {
                continue;
            }

            let mut slot = match result.entry(key.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(incoming.clone());
                    continue;
                }
                Entry::Occupied(slot) => slot,
            };

            let existing = slot.get_mut();
            if is_empty(existing) {
                *existing = incoming.clone();
                continue;
            }

            match (existing, incoming) {
                (Value::Array(current), Value::Array(additions)) => {
                    current.extend(additions.iter().cloned());
                    *current = dedup_values(std::mem::take(current));
                }
                (Value::Object(current), Value::Object(additions)) => {
                    for (k, v) in additions {
                        if !is_empty(v) {
                            current.insert(k.clone(), v.clone());
                        }
                    }
                }
                _ => {
                    // No merge rule for scalar or mismatched shapes;
                    // first non-empty value stands.
                    debug!("Merge conflict on key '{}': keeping existing value", key);
                }
            }
        }
    }

    postprocess_record(&mut result);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_empty_input_yields_empty_map() {
        assert!(merge_records(&[]).is_empty());
    }

    #[test]
    fn test_null_never_overwrites() {
        let merged = merge_records(&[obj(json!({"a": null})), obj(json!({"a": "x"}))]);
        assert_eq!(merged["a"], json!("x"));
    }

    #[test]
    fn test_first_non_empty_wins() {
        let merged = merge_records(&[obj(json!({"a": "first"})), obj(json!({"a": "second"}))]);
        assert_eq!(merged["a"], json!("first"));

        // Reversed input flips the result: the fold is order-dependent
        let merged = merge_records(&[obj(json!({"a": "second"})), obj(json!({"a": "first"}))]);
        assert_eq!(merged["a"], json!("second"));
    }

    #[test]
    fn test_empty_string_and_zero_are_empty() {
        let merged = merge_records(&[
            obj(json!({"a": "", "b": 0})),
            obj(json!({"a": "value", "b": 7})),
        ]);
        assert_eq!(merged["a"], json!("value"));
        assert_eq!(merged["b"], json!(7));
    }

    #[test]
    fn test_list_concat_and_dedup() {
        let merged = merge_records(&[
            obj(json!({"tags": ["x", "y"]})),
            obj(json!({"tags": ["y", "z"]})),
        ]);
        assert_eq!(merged["tags"], json!(["x", "y", "z"]));
    }

    #[test]
    fn test_list_dedup_is_structural() {
        let merged = merge_records(&[
            obj(json!({"items": [{"a": 1, "b": 2}]})),
            obj(json!({"items": [{"b": 2, "a": 1}, {"a": 3}]})),
        ]);
        assert_eq!(merged["items"], json!([{"a": 1, "b": 2}, {"a": 3}]));
    }

    #[test]
    fn test_dict_union_skips_empty_incoming() {
        let merged = merge_records(&[
            obj(json!({"m": {"k1": 1}})),
            obj(json!({"m": {"k1": 0, "k2": 2}})),
        ]);
        // Zero is empty, so k1 is not overwritten
        assert_eq!(merged["m"], json!({"k1": 1, "k2": 2}));
    }

    #[test]
    fn test_dict_union_overwrites_with_non_empty() {
        let merged = merge_records(&[
            obj(json!({"m": {"k1": 1}})),
            obj(json!({"m": {"k1": 9}})),
        ]);
        assert_eq!(merged["m"], json!({"k1": 9}));
    }

    #[test]
    fn test_type_mismatch_keeps_existing() {
        let merged = merge_records(&[
            obj(json!({"a": "scalar"})),
            obj(json!({"a": ["list"]})),
        ]);
        assert_eq!(merged["a"], json!("scalar"));
    }

    #[test]
    fn test_party_dedup_is_case_and_whitespace_insensitive() {
        let merged = merge_records(&[
            obj(json!({"parties": [{"role": "buyer", "name": "Acme"}]})),
            obj(json!({"parties": [{"role": "seller", "name": "ACME "}]})),
        ]);
        assert_eq!(merged["parties"], json!([{"role": "buyer", "name": "Acme"}]));
    }

    #[test]
    fn test_party_with_empty_name_is_dropped() {
        let merged = merge_records(&[obj(json!({
            "parties": [{"role": "witness", "name": "  "}, {"role": "buyer", "name": "Acme"}]
        }))]);
        assert_eq!(merged["parties"], json!([{"role": "buyer", "name": "Acme"}]));
    }

    #[test]
    fn test_clause_dedup_keeps_distinct_presence() {
        let merged = merge_records(&[
            obj(json!({"clauses": [{"name": "non-compete", "present": true}]})),
            obj(json!({"clauses": [{"name": "Non-Compete", "present": false}]})),
        ]);
        let clauses = merged["clauses"].as_array().unwrap();
        assert_eq!(clauses.len(), 2);
    }

    #[test]
    fn test_clause_dedup_collapses_exact_repeats() {
        let merged = merge_records(&[
            obj(json!({"clauses": [{"name": "indemnification", "present": true}]})),
            obj(json!({"clauses": [{"name": "Indemnification ", "present": true, "text": "as stated"}]})),
        ]);
        let clauses = merged["clauses"].as_array().unwrap();
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0]["name"], json!("indemnification"));
    }

    #[test]
    fn test_single_record_still_gets_dedup_pass() {
        let merged = merge_records(&[obj(json!({
            "contract_type": "nda",
            "parties": [{"name": "Acme"}, {"name": "acme"}]
        }))]);
        assert_eq!(merged["parties"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_present_defaults_to_absent() {
        let merged = merge_records(&[obj(json!({
            "clauses": [{"name": "audit"}, {"name": "audit", "present": false}]
        }))]);
        // bool(missing) == bool(false): these collapse into one entry
        assert_eq!(merged["clauses"].as_array().unwrap().len(), 1);
    }
}
