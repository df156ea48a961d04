//! Core orchestrator: chunk, extract, repair, merge

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::merge::merge_records;
use crate::prompt::PromptBuilder;
use crate::repair::{extract_json_object, repair};
use crate::segmenter::TokenSegmenter;
use covenant_domain::{ContractRecord, SchemaRegistry};
use covenant_llm::{ChatClient, ChatMessage};
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Drives the per-document extraction flow
///
/// Short documents go through a single oracle call; long ones are split
/// under the token budget, extracted chunk by chunk in order, and the
/// partial records merged into one. Repair and schema ambiguities resolve
/// to deterministic fallbacks; only the oracle call itself can fail a
/// document.
pub struct MetadataExtractor<C: ChatClient> {
    client: Arc<C>,
    registry: SchemaRegistry,
    segmenter: TokenSegmenter,
    config: ExtractorConfig,
}

impl<C: ChatClient + 'static> MetadataExtractor<C> {
    /// Create a new extractor around an oracle client
    pub fn new(client: C, config: ExtractorConfig) -> Self {
        let segmenter = TokenSegmenter::for_model(client.model());
        Self {
            client: Arc::new(client),
            registry: SchemaRegistry::builtin(),
            segmenter,
            config,
        }
    }

    /// Extract a structured record from one document's text
    pub async fn extract(
        &self,
        source_id: &str,
        text: &str,
    ) -> Result<ContractRecord, ExtractorError> {
        let token_count = self.segmenter.count(text);
        info!(
            "Starting extraction for '{}': ~{} tokens, budget {}",
            source_id, token_count, self.config.max_chunk_tokens
        );

        if token_count <= self.config.max_chunk_tokens {
            return self.extract_single(source_id, text).await;
        }

        info!("Text exceeds token budget, chunking...");
        self.extract_from_chunks(source_id, text).await
    }

    /// One oracle round-trip for a single chunk of text
    async fn extract_single(
        &self,
        source_id: &str,
        text: &str,
    ) -> Result<ContractRecord, ExtractorError> {
        let prompt = PromptBuilder::new(text.to_string(), self.registry.menu_json()).build();
        debug!("Prompt length: {} chars", prompt.len());

        let messages = [ChatMessage::system(prompt)];
        let raw = timeout(
            self.config.extraction_timeout(),
            self.client.chat(&messages),
        )
        .await
        .map_err(|_| ExtractorError::Timeout)?
        .map_err(|e| ExtractorError::Oracle(e.to_string()))?;

        debug!("Oracle response length: {} chars", raw.len());

        let blob = extract_json_object(&raw).unwrap_or(&raw);
        let Some(data) = repair(blob) else {
            error!(
                "Unrecoverable JSON for '{}' (first {} chars): {}",
                source_id,
                self.config.payload_preview_chars,
                preview(blob, self.config.payload_preview_chars)
            );
            return Ok(ContractRecord::fallback());
        };

        Ok(self.resolve_and_construct(source_id, data))
    }

    /// Chunked path: sequential per-chunk extraction, then merge
    async fn extract_from_chunks(
        &self,
        source_id: &str,
        text: &str,
    ) -> Result<ContractRecord, ExtractorError> {
        let chunks = self.segmenter.split(text, self.config.max_chunk_tokens);
        info!("Split text into {} chunks", chunks.len());

        let mut partials = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("Processing chunk {}/{} for '{}'", idx + 1, chunks.len(), source_id);
            let chunk_id = format!("{}:chunk:{}", source_id, idx);
            let record = self.extract_single(&chunk_id, chunk).await?;
            partials.push(record);
        }

        let maps: Vec<Map<String, Value>> = partials
            .iter()
            .map(|record| match record.to_value() {
                Value::Object(map) => map,
                _ => Map::new(),
            })
            .collect();

        let merged = merge_records(&maps);
        Ok(self.resolve_and_construct(source_id, merged))
    }

    /// Resolve the record shape for the claimed contract type and build
    /// the typed record
    ///
    /// A record whose declared fields do not fit the resolved variant is
    /// not an error; it is re-routed through the generic shape so nothing
    /// the oracle produced is discarded wholesale.
    fn resolve_and_construct(&self, source_id: &str, data: Map<String, Value>) -> ContractRecord {
        let contract_type = data
            .get("contract_type")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_lowercase();

        let descriptor = self.registry.resolve(&contract_type);
        let value = Value::Object(data);

        match (descriptor.construct)(value.clone()) {
            Ok(record) => record,
            Err(e) => {
                warn!(
                    "Record for '{}' does not fit the '{}' shape ({}); using generic",
                    source_id, descriptor.name, e
                );
                (self.registry.generic().construct)(value)
                    .unwrap_or_else(|_| ContractRecord::fallback())
            }
        }
    }
}

/// Char-boundary-safe prefix for log previews of untrusted payloads
fn preview(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
