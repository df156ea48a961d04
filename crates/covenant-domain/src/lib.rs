//! Covenant Domain Layer
//!
//! Core data model for contract metadata extraction. Defines the canonical
//! record shapes (generic plus contract-type-specific variants) and the
//! static schema registry that maps a declared contract-type label to the
//! most specific known shape.
//!
//! ## Key Concepts
//!
//! - **ContractRecord**: the canonical extraction result for one document
//! - **Variant**: a contract-type-specific extension of the generic shape
//! - **SchemaRegistry**: closed, statically registered set of variants;
//!   unknown labels resolve to the generic shape
//!
//! Infrastructure (LLM clients, the extraction pipeline, the CLI) lives in
//! other crates and depends on this one.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod contract;
pub mod registry;
pub mod variants;

// Re-exports for convenience
pub use contract::{Clause, ContractRecord, GenericContract, Party};
pub use registry::{SchemaRegistry, VariantDescriptor};
pub use variants::{EmploymentContract, NdaContract, ServiceAgreementContract};
