//! Token counting and text segmentation
//!
//! Primary mode encodes text with the model's BPE tokenizer and slices the
//! token ids into contiguous non-overlapping windows, so concatenating the
//! decoded chunks round-trips the original text (modulo encoder fidelity).
//! When no tokenizer is known for the model, a degraded mode approximates
//! one token per four characters and splits on character windows, which
//! round-trips exactly.

use tiktoken_rs::{cl100k_base, get_bpe_from_model, o200k_base, CoreBPE};
use tracing::debug;

/// Approximate characters per token in degraded mode
const CHARS_PER_TOKEN: usize = 4;

/// Counts and splits text under a model-specific token budget
pub struct TokenSegmenter {
    bpe: Option<CoreBPE>,
}

impl TokenSegmenter {
    /// Build a segmenter for a model or encoding name
    ///
    /// Accepts model names ("gpt-4o-mini") and encoding names
    /// ("cl100k_base", "o200k_base"). Anything unrecognized falls back to
    /// degraded character-based estimation.
    pub fn for_model(model: &str) -> Self {
        let lower = model.to_ascii_lowercase();
        let bpe = get_bpe_from_model(&lower).ok().or_else(|| match lower.as_str() {
            "o200k_base" => o200k_base().ok(),
            "cl100k_base" => cl100k_base().ok(),
            _ => None,
        });

        if bpe.is_none() {
            debug!(
                "No tokenizer for model '{}', using character approximation",
                model
            );
        }

        Self { bpe }
    }

    /// Build a segmenter that always uses the character approximation
    pub fn degraded() -> Self {
        Self { bpe: None }
    }

    /// Whether this segmenter is running without a real tokenizer
    pub fn is_degraded(&self) -> bool {
        self.bpe.is_none()
    }

    /// Estimated token length of `text`
    pub fn count(&self, text: &str) -> usize {
        match &self.bpe {
            Some(bpe) => bpe.encode_ordinary(text).len(),
            None => approx_token_len(text),
        }
    }

    /// Split `text` into ordered chunks of at most `max_tokens` estimated
    /// tokens each
    ///
    /// Empty input yields zero chunks. A token window whose boundary lands
    /// inside a multi-byte sequence cannot be decoded in isolation; when
    /// that happens the whole text is re-split in degraded character mode,
    /// which is always boundary-safe.
    pub fn split(&self, text: &str, max_tokens: usize) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        let max_tokens = max_tokens.max(1);

        if let Some(bpe) = &self.bpe {
            let ids = bpe.encode_ordinary(text);
            let mut chunks = Vec::with_capacity(ids.len().div_ceil(max_tokens));
            for window in ids.chunks(max_tokens) {
                match bpe.decode(window.to_vec()) {
                    Ok(chunk) => chunks.push(chunk),
                    Err(_) => return split_by_chars(text, max_tokens),
                }
            }
            return chunks;
        }

        split_by_chars(text, max_tokens)
    }
}

fn approx_token_len(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Character-window split; `max_tokens * 4` characters per chunk,
/// respecting char boundaries
fn split_by_chars(text: &str, max_tokens: usize) -> Vec<String> {
    let step = max_tokens.saturating_mul(CHARS_PER_TOKEN).max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == step {
            chunks.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
