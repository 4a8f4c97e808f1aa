//! Provider implementations for different LLM services.
//!
//! Each wire format lives in its own submodule; all of them implement the
//! [`ChatModel`](crate::chat_models::ChatModel) trait. Construction goes
//! through [`ProviderRegistry`](crate::registry::ProviderRegistry), which
//! binds each [`Provider`](crate::provider::Provider) value to one of these.

pub mod anthropic;
pub mod google;
pub mod ollama;
pub mod openai;

pub use anthropic::ChatAnthropic;
pub use google::ChatGoogle;
pub use ollama::{ChatOllama, OllamaLlm};
pub use openai::{AzureChatOpenAi, ChatOpenAi};

use crate::error::{Error, Result};

/// Shared POST helper: send a JSON payload, fail on non-2xx with the body
/// preserved for the server-side log.
pub(crate) async fn post_json(
    request: reqwest::RequestBuilder,
    payload: &serde_json::Value,
) -> Result<serde_json::Value> {
    let response = request.json(payload).send().await.map_err(Error::Http)?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
        return Err(Error::api(status, error_text));
    }

    response.json().await.map_err(Error::Http)
}

pub(crate) fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(300))
        .build()
        .map_err(Error::Http)
}
