//! Static provider registry: maps a [`Provider`] value to a concrete
//! [`ChatModel`] instance built from the process-wide settings.

use crate::chat_models::{CallOptions, ChatModel};
use crate::error::{Error, Result};
use crate::provider::{Provider, ProviderSettings};
use crate::providers::{AzureChatOpenAi, ChatAnthropic, ChatGoogle, ChatOllama, ChatOpenAi, OllamaLlm};

/// Produces chat model instances for a provider selection.
///
/// Split out as a trait so handlers can be exercised against scripted fakes
/// without network access.
pub trait ModelFactory: Send + Sync {
    fn model(&self, provider: Provider, options: &CallOptions) -> Result<Box<dyn ChatModel>>;
}

/// Production factory over the environment-derived [`ProviderSettings`].
///
/// Construction fails per call when the selected provider misses a required
/// credential; the set of providers itself is fixed at compile time.
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    settings: ProviderSettings,
}

impl ProviderRegistry {
    pub fn new(settings: ProviderSettings) -> Self {
        Self { settings }
    }

    pub fn from_env() -> Self {
        Self::new(ProviderSettings::from_env())
    }
}

impl ModelFactory for ProviderRegistry {
    fn model(&self, provider: Provider, options: &CallOptions) -> Result<Box<dyn ChatModel>> {
        let s = &self.settings;
        let model: Box<dyn ChatModel> = match provider {
            Provider::OpenAi => {
                let api_key = s
                    .openai_api_key
                    .clone()
                    .ok_or_else(|| Error::not_configured("openai", "OPENAI_API_KEY"))?;
                let mut m = ChatOpenAi::new(&s.openai_model).with_api_key(api_key);
                if let Some(base) = &s.openai_base_url {
                    m = m.with_base_url(base);
                }
                Box::new(m)
            }
            Provider::OpenAiLocal => {
                let mut m = ChatOpenAi::local(&s.local_model, &s.local_base_url);
                if let Some(key) = &s.local_api_key {
                    m = m.with_api_key(key);
                }
                Box::new(m)
            }
            Provider::Ollama => {
                Box::new(OllamaLlm::new(&s.ollama_model).with_base_url(&s.ollama_host))
            }
            Provider::OllamaChat => {
                Box::new(ChatOllama::new(&s.ollama_model).with_base_url(&s.ollama_host))
            }
            Provider::Azure => {
                let endpoint = s
                    .azure_endpoint
                    .clone()
                    .ok_or_else(|| Error::not_configured("azure", "AZURE_OPENAI_ENDPOINT"))?;
                let api_key = s
                    .azure_api_key
                    .clone()
                    .ok_or_else(|| Error::not_configured("azure", "AZURE_OPENAI_API_KEY"))?;
                Box::new(AzureChatOpenAi::new(
                    endpoint,
                    &s.azure_deployment,
                    api_key,
                    &s.azure_api_version,
                ))
            }
            Provider::Anthropic => {
                let api_key = s
                    .anthropic_api_key
                    .clone()
                    .ok_or_else(|| Error::not_configured("anthropic", "ANTHROPIC_API_KEY"))?;
                Box::new(ChatAnthropic::new(
                    &s.anthropic_model,
                    api_key,
                    &s.anthropic_version,
                ))
            }
            Provider::Google => {
                let api_key = s
                    .google_api_key
                    .clone()
                    .ok_or_else(|| Error::not_configured("google", "GOOGLE_API_KEY"))?;
                Box::new(ChatGoogle::new(&s.google_model, api_key))
            }
        };

        tracing::debug!(
            provider = %provider,
            model = model.model_name(),
            override_model = options.model.as_deref().unwrap_or(""),
            "resolved chat model"
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_with_keys() -> ProviderSettings {
        ProviderSettings {
            openai_api_key: Some("sk-test".into()),
            openai_model: "gpt-4o-mini".into(),
            local_base_url: "http://localhost:8000/v1".into(),
            local_model: "local".into(),
            ollama_host: "http://localhost:11434".into(),
            ollama_model: "llama3.1".into(),
            azure_endpoint: Some("https://unit.openai.azure.com".into()),
            azure_api_key: Some("azk".into()),
            azure_api_version: "2024-06-01".into(),
            azure_deployment: "gpt-4o-mini".into(),
            anthropic_api_key: Some("ak".into()),
            anthropic_version: "2023-06-01".into(),
            anthropic_model: "claude-sonnet-4-5".into(),
            google_api_key: Some("gk".into()),
            google_model: "gemini-2.0-flash".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_every_provider_resolves_when_configured() {
        let registry = ProviderRegistry::new(settings_with_keys());
        for provider in Provider::ALL {
            let model = registry.model(provider, &CallOptions::default()).unwrap();
            assert_eq!(model.provider_name(), provider.route_prefix());
        }
    }

    #[test]
    fn test_missing_credential_is_reported() {
        let registry = ProviderRegistry::new(ProviderSettings {
            ollama_host: "http://localhost:11434".into(),
            ollama_model: "llama3.1".into(),
            ..Default::default()
        });

        assert!(matches!(
            registry.model(Provider::OpenAi, &CallOptions::default()),
            Err(Error::NotConfigured { .. })
        ));

        // Ollama needs no credential.
        assert!(
            registry
                .model(Provider::Ollama, &CallOptions::default())
                .is_ok()
        );
    }
}
