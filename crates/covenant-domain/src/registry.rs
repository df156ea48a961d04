//! Static schema registry
//!
//! Maps canonical contract-type labels to variant descriptors. The set of
//! variants is closed and registered at construction time; there is no
//! dynamic discovery. Unknown labels resolve to the generic shape.

use serde_json::{json, Value};

use crate::contract::{ContractRecord, GenericContract};
use crate::variants::{
    EmploymentContract, NdaContract, ServiceAgreementContract, EMPLOYMENT_TYPE, NDA_TYPE,
    SERVICE_AGREEMENT_TYPE,
};

/// Constructor from an untyped mapping to a typed record
///
/// Constructors tolerate unknown keys; the generic constructor routes them
/// into `custom_fields`, typed variants drop them.
pub type RecordConstructor = fn(Value) -> Result<ContractRecord, serde_json::Error>;

/// A registered record shape: canonical name, field menu, constructor
#[derive(Clone)]
pub struct VariantDescriptor {
    /// Canonical lower-cased type label ("employment", "nda", ...)
    pub name: &'static str,

    /// Field name → type hint pairs beyond the shared base fields
    pub extra_fields: &'static [(&'static str, &'static str)],

    /// Builds the typed record from oracle output
    pub construct: RecordConstructor,
}

impl std::fmt::Debug for VariantDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VariantDescriptor")
            .field("name", &self.name)
            .field("extra_fields", &self.extra_fields)
            .finish()
    }
}

/// Fields shared by every record shape
const BASE_FIELDS: &[(&str, &str)] = &[
    ("contract_type", "string"),
    ("parties", "[{role: string, name: string}]"),
    ("effective_date", "string | null"),
    ("termination_date", "string | null"),
    ("governing_law", "string | null"),
    ("renewal_terms", "string | null"),
    ("clauses", "[{name: string, present: bool, text: string | null}]"),
    ("custom_fields", "{string: any}"),
];

fn construct_employment(value: Value) -> Result<ContractRecord, serde_json::Error> {
    Ok(ContractRecord::Employment(serde_json::from_value::<
        EmploymentContract,
    >(value)?))
}

fn construct_nda(value: Value) -> Result<ContractRecord, serde_json::Error> {
    Ok(ContractRecord::Nda(serde_json::from_value::<NdaContract>(
        value,
    )?))
}

fn construct_service_agreement(value: Value) -> Result<ContractRecord, serde_json::Error> {
    Ok(ContractRecord::ServiceAgreement(serde_json::from_value::<
        ServiceAgreementContract,
    >(value)?))
}

fn construct_generic(value: Value) -> Result<ContractRecord, serde_json::Error> {
    Ok(ContractRecord::Generic(
        GenericContract::from_value_routing_unknowns(value),
    ))
}

/// The closed set of known record shapes
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    variants: Vec<VariantDescriptor>,
    generic: VariantDescriptor,
}

impl SchemaRegistry {
    /// Build the registry with every built-in variant registered
    pub fn builtin() -> Self {
        Self {
            variants: vec![
                VariantDescriptor {
                    name: EMPLOYMENT_TYPE,
                    extra_fields: &[
                        ("employee_name", "string | null"),
                        ("employer_name", "string | null"),
                        ("compensation", "string | null"),
                        ("probation_period", "string | null"),
                    ],
                    construct: construct_employment,
                },
                VariantDescriptor {
                    name: NDA_TYPE,
                    extra_fields: &[
                        ("confidentiality_period", "string | null"),
                        ("non_compete", "bool | null"),
                    ],
                    construct: construct_nda,
                },
                VariantDescriptor {
                    name: SERVICE_AGREEMENT_TYPE,
                    extra_fields: &[
                        ("payment_terms", "string | null"),
                        ("indemnification", "bool | null"),
                        ("limitation_of_liability", "string | null"),
                    ],
                    construct: construct_service_agreement,
                },
            ],
            generic: VariantDescriptor {
                name: "generic",
                extra_fields: &[],
                construct: construct_generic,
            },
        }
    }

    /// Resolve a contract-type label to the most specific known shape
    ///
    /// Matching is exact string equality on the lower-cased label; anything
    /// else resolves to the generic descriptor.
    pub fn resolve(&self, contract_type: &str) -> &VariantDescriptor {
        let needle = contract_type.to_lowercase();
        self.variants
            .iter()
            .find(|v| v.name == needle)
            .unwrap_or(&self.generic)
    }

    /// The generic descriptor used when nothing else matches
    pub fn generic(&self) -> &VariantDescriptor {
        &self.generic
    }

    /// JSON document describing every registered shape, embedded in the
    /// extraction prompt as the schema menu
    pub fn menu_json(&self) -> String {
        let mut menu = serde_json::Map::new();
        for descriptor in self.variants.iter().chain(std::iter::once(&self.generic)) {
            let mut fields = serde_json::Map::new();
            for (name, hint) in BASE_FIELDS.iter().chain(descriptor.extra_fields.iter()) {
                fields.insert((*name).to_string(), json!(hint));
            }
            menu.insert(descriptor.name.to_string(), Value::Object(fields));
        }
        // Maps serialize deterministically, so the prompt is stable
        serde_json::to_string_pretty(&Value::Object(menu)).unwrap_or_default()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
