//! Covenant Oracle Layer
//!
//! Pluggable chat-completion clients used by the extraction pipeline.
//!
//! # Architecture
//!
//! The pipeline talks to an LLM through the `ChatClient` trait: an ordered
//! sequence of role-tagged messages goes in, free-form text comes out. The
//! text is untrusted; repair and validation happen downstream in
//! `covenant-extractor`.
//!
//! # Clients
//!
//! - `MockClient`: deterministic mock for testing
//! - `OpenAiClient`: OpenAI-compatible chat-completions endpoint
//!
//! # Examples
//!
//! ```
//! use covenant_llm::{ChatClient, ChatMessage, MockClient};
//!
//! # async fn example() {
//! let client = MockClient::new("{\"contract_type\": \"nda\"}");
//! let reply = client.chat(&[ChatMessage::system("prompt")]).await.unwrap();
//! assert_eq!(reply, "{\"contract_type\": \"nda\"}");
//! # }
//! ```

#![warn(missing_docs)]

pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use openai::OpenAiClient;

/// Errors that can occur during oracle operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the endpoint
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// A role-tagged message in a chat-completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message role ("system", "user", "assistant")
    pub role: String,

    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Retry policy for oracle calls
///
/// Attempt `n` (zero-based) sleeps `base_delay * 2^n` before retrying.
/// `RetryPolicy::none()` disables retries entirely.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first)
    pub max_attempts: u32,

    /// Delay before the first retry; doubles on each subsequent retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// A single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Backoff delay before retry number `attempt` (zero-based), or None
    /// when the attempts are exhausted
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if attempt + 1 >= self.max_attempts {
            return None;
        }
        Some(self.base_delay * 2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Trait for chat-completion clients
///
/// Implementations are shared read-only across concurrent document
/// pipelines; calls carry no per-client mutable state.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send an ordered sequence of messages, returning the raw completion
    /// text
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;

    /// Model identifier, used for token-length estimation
    fn model(&self) -> &str;
}

/// Mock chat client for deterministic testing
///
/// Returns pre-configured responses without any network calls. Responses
/// can be keyed on a substring of the prompt, and errors can be injected.
#[derive(Debug, Clone)]
pub struct MockClient {
    model: String,
    default_response: String,
    responses: Arc<Mutex<HashMap<String, String>>>,
    call_count: Arc<Mutex<usize>>,
}

const MOCK_ERROR_MARKER: &str = "\u{0}ERROR";

impl MockClient {
    /// Create a mock that answers every prompt with `response`
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            model: "mock-model".to_string(),
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    /// Override the reported model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Answer with `response` whenever the last message contains `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(needle.into(), response.into());
    }

    /// Fail whenever the last message contains `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(needle.into(), MOCK_ERROR_MARKER.to_string());
    }

    /// Number of chat calls made so far
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl ChatClient for MockClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        *self.call_count.lock().unwrap() += 1;

        let prompt = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        let responses = self.responses.lock().unwrap();
        for (needle, response) in responses.iter() {
            if prompt.contains(needle.as_str()) {
                if response == MOCK_ERROR_MARKER {
                    return Err(LlmError::Other("Mock error".to_string()));
                }
                return Ok(response.clone());
            }
        }

        Ok(self.default_response.clone())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
