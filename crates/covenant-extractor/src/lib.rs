//! Covenant Extractor
//!
//! Chunked-extraction reconciliation pipeline for contract metadata.
//!
//! # Overview
//!
//! Contract text goes in; one schema-conformant record comes out. Long
//! documents are split into model-sized chunks, each chunk is interpreted
//! by an LLM oracle, the oracle's (untrusted) output is repaired into a
//! JSON object, and the partial records are merged deterministically into
//! a single result.
//!
//! # Architecture
//!
//! ```text
//! Text → Segmenter → [oracle per chunk] → Repair → Registry → Merge → Record
//! ```
//!
//! # Key Properties
//!
//! - **Never aborts on bad oracle output**: unparsable payloads become a
//!   minimal fallback record, logged and carried on
//! - **Deterministic merge**: first-non-empty-wins with order-preserving
//!   dedup, so chunk order fully determines the result
//! - **Typed at the boundary only**: merging happens on untyped JSON
//!   trees; typed variants are constructed before and after
//!
//! # Example Usage
//!
//! ```no_run
//! use covenant_extractor::{ExtractorConfig, MetadataExtractor};
//! use covenant_llm::MockClient;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MockClient::new(r#"{"contract_type": "nda", "parties": []}"#);
//! let extractor = MetadataExtractor::new(client, ExtractorConfig::default());
//!
//! let record = extractor.extract("nda.txt", "Mutual NDA between ...").await?;
//! println!("{}", record.to_value());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod extractor;
mod merge;
mod prompt;
mod repair;
mod segmenter;

#[cfg(test)]
mod tests;

pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use extractor::MetadataExtractor;
pub use merge::{is_empty, merge_records};
pub use repair::{extract_json_object, repair};
pub use segmenter::TokenSegmenter;
