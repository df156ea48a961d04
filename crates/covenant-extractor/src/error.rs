//! Error types for the extraction pipeline

use thiserror::Error;

/// Errors that can occur during extraction
///
/// Repair and merge ambiguities never surface here; they resolve to
/// deterministic fallbacks so a document always produces a record. Only
/// infrastructure failures (the oracle call itself) are fatal, and only
/// for the document that hit them.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// The oracle call failed (network, rate limit, bad endpoint)
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// The oracle call exceeded the configured timeout
    #[error("Extraction timeout")]
    Timeout,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
