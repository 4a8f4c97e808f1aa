//! llm-kit - provider dispatch and chain/agent invocation.
//!
//! This crate provides:
//! - Message types for LLM conversations (system, human, AI, tool)
//! - The `ChatModel` trait and provider integrations (OpenAI, OpenAI-compatible
//!   local endpoints, Ollama generate/chat, Azure, Anthropic, Google)
//! - `Chain` and `Agent` invocation over a composed system prompt
//! - A compile-time tool registry for agent mode
//! - Bounded in-process conversation memory
//!
//! # Architecture
//!
//! - **Provider layer** ([`providers`]): one `ChatModel` implementation per
//!   wire format, selected through [`ProviderRegistry`]
//! - **Invocation layer** ([`chain`]): `Chain` for bare calls, `Agent` for
//!   tool-augmented calls with a bounded tool loop
//! - **Tools layer** ([`tools`]): statically linked tools resolved by name
//!
//! # Quick start
//!
//! ```ignore
//! use llm_kit::{CallOptions, Chain, ChatMemory, ModelFactory, Provider, ProviderRegistry};
//!
//! let registry = ProviderRegistry::from_env();
//! let model = registry.model(Provider::Ollama, &CallOptions::default())?;
//! let chain = Chain::new(model, ChatMemory::default());
//! ```

pub mod chain;
pub mod chat_models;
pub mod error;
pub mod fake;
pub mod memory;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod tools;

pub use chain::{Agent, AgentStep, Chain, ChainRequest, ChainResponse};
pub use chat_models::{CallOptions, ChatModel, ChatResult, UsageMetadata};
pub use error::{Error, Result};
pub use fake::{FakeChatModel, FakeModelFactory};
pub use memory::ChatMemory;
pub use messages::{AIMessage, BaseMessage, HumanMessage, SystemMessage, ToolCall, ToolMessage};
pub use provider::{Provider, ProviderSettings};
pub use registry::{ModelFactory, ProviderRegistry};
pub use tools::{Tool, ToolDefinition, builtin_tool_names, resolve_tool};
