//! Contract module - the canonical record shapes for extraction results

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::variants::{EmploymentContract, NdaContract, ServiceAgreementContract};

/// Contract-type label used when extraction is unrecoverable
pub const UNKNOWN_CONTRACT_TYPE: &str = "unknown";

/// A party to the contract
///
/// Identity for deduplication is the lower-cased, trimmed `name`; parties
/// with an empty name never claim a dedup key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// Role of the party in the contract (e.g., "employer", "licensee")
    #[serde(default)]
    pub role: String,

    /// Legal name of the party
    #[serde(default)]
    pub name: String,
}

/// A detected clause and whether it is present in the contract
///
/// Identity for deduplication is the pair of lower-cased trimmed `name`
/// and the `present` flag, so the same clause can legitimately appear
/// twice when chunks disagree about its presence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// Name of the clause (e.g., "indemnification", "non-compete")
    #[serde(default)]
    pub name: String,

    /// Whether the clause appears in the document
    #[serde(default)]
    pub present: bool,

    /// Verbatim clause text, when captured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Fallback record shape able to hold any contract
///
/// Unknown-but-important fields extracted by the oracle are routed into
/// `custom_fields`; the typed variants carry their extras as declared
/// optional fields instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenericContract {
    /// Short contract-type label, lower-cased for registry matching
    #[serde(default)]
    pub contract_type: String,

    /// Parties to the contract, in extraction order
    #[serde(default)]
    pub parties: Vec<Party>,

    /// Date the contract takes effect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,

    /// Date the contract terminates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_date: Option<String>,

    /// Governing law / jurisdiction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governing_law: Option<String>,

    /// Renewal terms, when stated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_terms: Option<String>,

    /// Detected clauses, in extraction order
    #[serde(default)]
    pub clauses: Vec<Clause>,

    /// Extra key/value pairs that fit no declared field
    #[serde(default)]
    pub custom_fields: Map<String, Value>,
}

impl GenericContract {
    /// Build a generic record from an untyped mapping, routing unknown
    /// keys into `custom_fields`
    ///
    /// Declared fields with an unexpected shape (e.g. a string where a
    /// list was expected) are dropped rather than failing the whole
    /// record; the oracle's output is untrusted.
    pub fn from_value_routing_unknowns(value: Value) -> Self {
        let Value::Object(map) = value else {
            return Self {
                contract_type: UNKNOWN_CONTRACT_TYPE.to_string(),
                ..Self::default()
            };
        };

        let mut record = Self::default();
        for (key, val) in map {
            match key.as_str() {
                "contract_type" => {
                    if let Value::String(s) = val {
                        record.contract_type = s;
                    }
                }
                "parties" => {
                    record.parties = serde_json::from_value(val).unwrap_or_default();
                }
                "clauses" => {
                    record.clauses = serde_json::from_value(val).unwrap_or_default();
                }
                "effective_date" => record.effective_date = as_opt_string(val),
                "termination_date" => record.termination_date = as_opt_string(val),
                "governing_law" => record.governing_law = as_opt_string(val),
                "renewal_terms" => record.renewal_terms = as_opt_string(val),
                "custom_fields" => {
                    if let Value::Object(m) = val {
                        record.custom_fields.extend(m);
                    }
                }
                _ => {
                    if !val.is_null() {
                        record.custom_fields.insert(key, val);
                    }
                }
            }
        }

        if record.contract_type.is_empty() {
            record.contract_type = UNKNOWN_CONTRACT_TYPE.to_string();
        }

        record
    }
}

fn as_opt_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// The canonical, schema-conformant extraction result for one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ContractRecord {
    /// Employment agreement
    Employment(EmploymentContract),
    /// Non-disclosure agreement
    Nda(NdaContract),
    /// Master service agreement
    ServiceAgreement(ServiceAgreementContract),
    /// Anything else, held by the generic shape
    Generic(GenericContract),
}

impl ContractRecord {
    /// Minimal record substituted when the oracle's output is
    /// unrecoverable
    pub fn fallback() -> Self {
        Self::Generic(GenericContract {
            contract_type: UNKNOWN_CONTRACT_TYPE.to_string(),
            ..GenericContract::default()
        })
    }

    /// The record's contract-type label
    pub fn contract_type(&self) -> &str {
        match self {
            Self::Employment(c) => &c.base.contract_type,
            Self::Nda(c) => &c.base.contract_type,
            Self::ServiceAgreement(c) => &c.base.contract_type,
            Self::Generic(c) => &c.contract_type,
        }
    }

    /// Serialize to an untyped mapping, with absent optional fields
    /// dropped (never serialized as null)
    pub fn to_value(&self) -> Value {
        // Serialization of these shapes cannot fail; skip_serializing_if
        // already removed every None before the map is built.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
