//! Contract-type-specific record variants
//!
//! Each variant embeds the full generic shape and adds optional fields
//! specific to that contract type. Extending the system means adding a
//! variant here and registering it in `registry::SchemaRegistry::builtin`.

use serde::{Deserialize, Serialize};

use crate::contract::GenericContract;

/// Canonical type label for employment agreements
pub const EMPLOYMENT_TYPE: &str = "employment";

/// Canonical type label for non-disclosure agreements
pub const NDA_TYPE: &str = "nda";

/// Canonical type label for master service agreements
pub const SERVICE_AGREEMENT_TYPE: &str = "service agreement";

/// Employment agreement record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmploymentContract {
    /// Shared base fields
    #[serde(flatten)]
    pub base: GenericContract,

    /// Name of the employee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,

    /// Name of the employer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employer_name: Option<String>,

    /// Compensation terms (salary, equity, bonus structure)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensation: Option<String>,

    /// Probation period, when stated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probation_period: Option<String>,
}

/// Non-disclosure agreement record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NdaContract {
    /// Shared base fields
    #[serde(flatten)]
    pub base: GenericContract,

    /// Duration of the confidentiality obligation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidentiality_period: Option<String>,

    /// Whether a non-compete obligation is included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_compete: Option<bool>,
}

/// Master service agreement record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceAgreementContract {
    /// Shared base fields
    #[serde(flatten)]
    pub base: GenericContract,

    /// Payment terms (net-30, milestones, retainers)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,

    /// Whether an indemnification clause is included
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indemnification: Option<bool>,

    /// Limitation of liability terms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limitation_of_liability: Option<String>,
}
