//! OpenAI chat-completions providers.
//!
//! `ChatOpenAi` talks to cloud OpenAI or any OpenAI-compatible endpoint
//! (llama.cpp server, vLLM, LM Studio); `AzureChatOpenAi` targets an Azure
//! OpenAI deployment, which differs only in URL shape and auth header. Both
//! share the payload builder and response parser below.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{build_client, post_json};
use crate::chat_models::{CallOptions, ChatModel, ChatResult, UsageMetadata};
use crate::error::{Error, Result};
use crate::messages::{AIMessage, BaseMessage, ToolCall};
use crate::tools::ToolDefinition;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI chat model (cloud or OpenAI-compatible local endpoint).
#[derive(Debug, Clone)]
pub struct ChatOpenAi {
    model: String,
    base_url: String,
    api_key: Option<String>,
    temperature: Option<f64>,
    provider_name: &'static str,
}

impl ChatOpenAi {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            api_key: None,
            temperature: None,
            provider_name: "openai",
        }
    }

    /// Local OpenAI-compatible endpoint; the api key is usually absent.
    pub fn local(model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: base_url.into(),
            api_key: None,
            temperature: None,
            provider_name: "localai",
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl ChatModel for ChatOpenAi {
    fn provider_name(&self) -> &'static str {
        self.provider_name
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        messages: &[BaseMessage],
        options: &CallOptions,
    ) -> Result<ChatResult> {
        let model = options.model.as_deref().unwrap_or(&self.model);
        let payload = build_payload(model, messages, self.temperature, options);

        let client = build_client()?;
        let mut request = client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Content-Type", "application/json");
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = post_json(request, &payload).await?;
        Ok(ChatResult::new(parse_response(&response)?))
    }
}

/// Azure OpenAI deployment. The deployment name plays the model role.
#[derive(Debug, Clone)]
pub struct AzureChatOpenAi {
    endpoint: String,
    deployment: String,
    api_key: String,
    api_version: String,
    temperature: Option<f64>,
}

impl AzureChatOpenAi {
    pub fn new(
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            deployment: deployment.into(),
            api_key: api_key.into(),
            api_version: api_version.into(),
            temperature: None,
        }
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl ChatModel for AzureChatOpenAi {
    fn provider_name(&self) -> &'static str {
        "azure"
    }

    fn model_name(&self) -> &str {
        &self.deployment
    }

    async fn generate(
        &self,
        messages: &[BaseMessage],
        options: &CallOptions,
    ) -> Result<ChatResult> {
        let deployment = options.model.as_deref().unwrap_or(&self.deployment);
        let mut payload = build_payload(deployment, messages, self.temperature, options);
        // Azure routes by deployment in the URL, not by payload model.
        payload.as_object_mut().map(|o| o.remove("model"));

        let url = format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, deployment, self.api_version
        );

        let client = build_client()?;
        let request = client
            .post(url)
            .header("Content-Type", "application/json")
            .header("api-key", &self.api_key);

        let response = post_json(request, &payload).await?;
        Ok(ChatResult::new(parse_response(&response)?))
    }
}

fn build_payload(
    model: &str,
    messages: &[BaseMessage],
    default_temperature: Option<f64>,
    options: &CallOptions,
) -> Value {
    let mut payload = json!({
        "model": model,
        "messages": format_messages(messages),
    });
    let obj = payload.as_object_mut().expect("payload is an object");

    if let Some(t) = options.temperature.or(default_temperature) {
        obj.insert("temperature".into(), json!(t));
    }
    if let Some(max) = options.max_tokens {
        obj.insert("max_tokens".into(), json!(max));
    }
    if options.format.as_deref() == Some("json") {
        obj.insert("response_format".into(), json!({"type": "json_object"}));
    }
    if !options.tools.is_empty() {
        obj.insert("tools".into(), tools_payload(&options.tools));
    }
    payload
}

/// Convert messages to the chat-completions wire format.
fn format_messages(messages: &[BaseMessage]) -> Vec<Value> {
    messages
        .iter()
        .map(|message| match message {
            BaseMessage::System(m) => json!({"role": "system", "content": m.content}),
            BaseMessage::Human(m) => json!({"role": "user", "content": m.content}),
            BaseMessage::AI(m) => {
                let mut value = json!({"role": "assistant", "content": m.content});
                if m.has_tool_calls() {
                    let calls: Vec<Value> = m
                        .tool_calls
                        .iter()
                        .map(|c| {
                            json!({
                                "id": c.id,
                                "type": "function",
                                "function": {
                                    "name": c.name,
                                    "arguments": c.arguments.to_string(),
                                },
                            })
                        })
                        .collect();
                    value
                        .as_object_mut()
                        .expect("assistant message is an object")
                        .insert("tool_calls".into(), json!(calls));
                }
                value
            }
            BaseMessage::Tool(m) => json!({
                "role": "tool",
                "content": m.content,
                "tool_call_id": m.tool_call_id,
            }),
        })
        .collect()
}

fn tools_payload(tools: &[ToolDefinition]) -> Value {
    let entries: Vec<Value> = tools
        .iter()
        .map(|t| {
            json!({
                "type": "function",
                "function": {
                    "name": t.name,
                    "description": t.description,
                    "parameters": t.parameters,
                },
            })
        })
        .collect();
    json!(entries)
}

fn parse_response(response: &Value) -> Result<AIMessage> {
    let message = response
        .pointer("/choices/0/message")
        .ok_or_else(|| Error::invalid_response("missing choices[0].message"))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| {
            calls
                .iter()
                .filter_map(|call| {
                    let id = call.get("id").and_then(Value::as_str)?.to_string();
                    let function = call.get("function")?;
                    let name = function.get("name").and_then(Value::as_str)?.to_string();
                    // Arguments arrive as a JSON-encoded string.
                    let arguments = function
                        .get("arguments")
                        .and_then(Value::as_str)
                        .and_then(|raw| serde_json::from_str(raw).ok())
                        .unwrap_or_else(|| json!({}));
                    Some(ToolCall {
                        id,
                        name,
                        arguments,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let usage = response.get("usage").map(|u| UsageMetadata {
        input_tokens: u.get("prompt_tokens").and_then(Value::as_u64).unwrap_or(0),
        output_tokens: u
            .get("completion_tokens")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        total_tokens: u.get("total_tokens").and_then(Value::as_u64).unwrap_or(0),
    });

    Ok(AIMessage {
        content,
        tool_calls,
        usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{HumanMessage, SystemMessage, ToolMessage};

    #[test]
    fn test_format_messages_roles() {
        let messages: Vec<BaseMessage> = vec![
            SystemMessage::new("sys").into(),
            HumanMessage::new("question").into(),
            ToolMessage::new("42", "call_1", "current_time").into(),
        ];
        let formatted = format_messages(&messages);
        assert_eq!(formatted[0]["role"], "system");
        assert_eq!(formatted[1]["role"], "user");
        assert_eq!(formatted[2]["role"], "tool");
        assert_eq!(formatted[2]["tool_call_id"], "call_1");
    }

    #[test]
    fn test_build_payload_options() {
        let options = CallOptions {
            temperature: Some(0.2),
            max_tokens: Some(512),
            format: Some("json".into()),
            ..Default::default()
        };
        let payload = build_payload("gpt-4o-mini", &[], None, &options);
        assert_eq!(payload["model"], "gpt-4o-mini");
        assert_eq!(payload["temperature"], 0.2);
        assert_eq!(payload["max_tokens"], 512);
        assert_eq!(payload["response_format"]["type"], "json_object");
        assert!(payload.get("tools").is_none());
    }

    #[test]
    fn test_parse_response_with_tool_calls() {
        let response = json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {
                            "name": "fetch_url",
                            "arguments": "{\"url\":\"https://example.com\"}"
                        }
                    }]
                }
            }],
            "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
        });
        let message = parse_response(&response).unwrap();
        assert!(message.content.is_empty());
        assert_eq!(message.tool_calls.len(), 1);
        assert_eq!(message.tool_calls[0].name, "fetch_url");
        assert_eq!(
            message.tool_calls[0].arguments["url"],
            "https://example.com"
        );
        assert_eq!(message.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_parse_response_missing_choices() {
        let err = parse_response(&json!({})).unwrap_err();
        assert!(err.to_string().contains("choices"));
    }
}
