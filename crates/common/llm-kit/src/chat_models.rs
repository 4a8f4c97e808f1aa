//! Core chat model abstraction implemented by every provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::messages::{AIMessage, BaseMessage};
use crate::tools::ToolDefinition;

/// Per-request generation options.
///
/// All fields are optional overrides; a provider falls back to its configured
/// defaults for anything unset. Tool definitions are only honored by
/// providers whose wire format supports function calling.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Model name override (e.g. "gpt-4o-mini", "llama3.1").
    pub model: Option<String>,
    pub temperature: Option<f64>,
    /// Context window size (Ollama `num_ctx`).
    pub num_ctx: Option<u32>,
    /// Maximum tokens to generate.
    pub max_tokens: Option<i32>,
    /// Output format constraint ("json" where supported).
    pub format: Option<String>,
    pub tools: Vec<ToolDefinition>,
}

/// Token accounting reported by the provider, when available.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
}

impl UsageMetadata {
    pub fn add(&mut self, other: &UsageMetadata) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Outcome of a single generation call.
#[derive(Debug, Clone)]
pub struct ChatResult {
    pub message: AIMessage,
}

impl ChatResult {
    pub fn new(message: AIMessage) -> Self {
        Self { message }
    }
}

/// Base trait implemented by all chat model providers.
///
/// A single `generate` call is one request/response exchange; no streaming,
/// no retries. Tool calls requested by the model are returned on the
/// [`AIMessage`], execution is the caller's concern.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Stable identifier of the backing provider, for logging.
    fn provider_name(&self) -> &'static str;

    /// The resolved model name this instance will call.
    fn model_name(&self) -> &str;

    async fn generate(&self, messages: &[BaseMessage], options: &CallOptions)
    -> Result<ChatResult>;
}
