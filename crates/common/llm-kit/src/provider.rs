//! Provider enumeration and environment-driven provider settings.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Supported LLM backends.
///
/// Each provider is bound to a stable URL-path prefix; the gateway iterates
/// [`Provider::ALL`] once at startup to generate one route per
/// (prefix, feature) pair. Never mutated at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Cloud OpenAI chat completions.
    OpenAi,
    /// OpenAI-compatible local endpoint (llama.cpp, vLLM, LM Studio...).
    OpenAiLocal,
    /// Ollama `/api/generate`.
    Ollama,
    /// Ollama `/api/chat` (tool capable).
    OllamaChat,
    /// Azure OpenAI deployment.
    Azure,
    Anthropic,
    Google,
}

impl Provider {
    pub const ALL: [Provider; 7] = [
        Provider::OpenAi,
        Provider::OpenAiLocal,
        Provider::Ollama,
        Provider::OllamaChat,
        Provider::Azure,
        Provider::Anthropic,
        Provider::Google,
    ];

    /// URL-path prefix used for route dispatch.
    pub fn route_prefix(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::OpenAiLocal => "localai",
            Provider::Ollama => "ollama",
            Provider::OllamaChat => "ollamachat",
            Provider::Azure => "azure",
            Provider::Anthropic => "anthropic",
            Provider::Google => "google",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.route_prefix())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Provider::ALL
            .iter()
            .copied()
            .find(|p| p.route_prefix() == s)
            .ok_or_else(|| Error::UnsupportedProvider(s.to_string()))
    }
}

/// Provider endpoint credentials and defaults, read once at process start.
#[derive(Debug, Clone, Default)]
pub struct ProviderSettings {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub openai_model: String,
    pub local_base_url: String,
    pub local_api_key: Option<String>,
    pub local_model: String,
    pub ollama_host: String,
    pub ollama_model: String,
    pub azure_endpoint: Option<String>,
    pub azure_api_key: Option<String>,
    pub azure_api_version: String,
    pub azure_deployment: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_version: String,
    pub anthropic_model: String,
    pub google_api_key: Option<String>,
    pub google_model: String,
}

impl ProviderSettings {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_base_url: non_empty_var("OPENAI_BASE_URL"),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            local_base_url: env::var("OPENAI_LOCAL_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/v1".to_string()),
            local_api_key: non_empty_var("OPENAI_LOCAL_API_KEY"),
            local_model: env::var("OPENAI_LOCAL_MODEL").unwrap_or_else(|_| "local".to_string()),
            ollama_host: env::var("OLLAMA_HOST")
                .unwrap_or_else(|_| "http://localhost:11434".to_string()),
            ollama_model: env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.1".to_string()),
            azure_endpoint: non_empty_var("AZURE_OPENAI_ENDPOINT"),
            azure_api_key: non_empty_var("AZURE_OPENAI_API_KEY"),
            azure_api_version: env::var("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|_| "2024-06-01".to_string()),
            azure_deployment: env::var("AZURE_OPENAI_DEPLOYMENT")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            anthropic_api_key: non_empty_var("ANTHROPIC_API_KEY"),
            anthropic_version: env::var("ANTHROPIC_VERSION")
                .unwrap_or_else(|_| "2023-06-01".to_string()),
            anthropic_model: env::var("ANTHROPIC_MODEL")
                .unwrap_or_else(|_| "claude-sonnet-4-5".to_string()),
            google_api_key: non_empty_var("GOOGLE_API_KEY"),
            google_model: env::var("GOOGLE_MODEL")
                .unwrap_or_else(|_| "gemini-2.0-flash".to_string()),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}
