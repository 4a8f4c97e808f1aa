//! Ollama providers.
//!
//! `ChatOllama` uses `/api/chat` and supports tool calling; `OllamaLlm` uses
//! the plain `/api/generate` completion endpoint and ignores tool
//! definitions (the wire format has none).

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{build_client, post_json};
use crate::chat_models::{CallOptions, ChatModel, ChatResult, UsageMetadata};
use crate::error::{Error, Result};
use crate::messages::{AIMessage, BaseMessage, ToolCall};

pub const DEFAULT_API_BASE: &str = "http://localhost:11434";

/// Ollama chat model (`/api/chat`).
#[derive(Debug, Clone)]
pub struct ChatOllama {
    model: String,
    base_url: String,
    temperature: Option<f64>,
}

impl ChatOllama {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            temperature: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl ChatModel for ChatOllama {
    fn provider_name(&self) -> &'static str {
        "ollamachat"
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

        let mut payload = json!({
            "model": model,
            "messages": format_messages(messages),
            "stream": false,
            "options": build_options(self.temperature, options),
        });
        let obj = payload.as_object_mut().expect("payload is an object");
        if options.format.as_deref() == Some("json") {
            obj.insert("format".into(), json!("json"));
        }
        if !options.tools.is_empty() {
            let tools: Vec<Value> = options
                .tools
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
            obj.insert("tools".into(), json!(tools));
        }

        let client = build_client()?;
        let request = client
            .post(format!("{}/api/chat", self.base_url))
            .header("Content-Type", "application/json");

        let response = post_json(request, &payload).await?;
        Ok(ChatResult::new(parse_chat_response(&response)?))
    }
}

/// Ollama completion model (`/api/generate`).
///
/// The message list is flattened: the leading system message becomes the
/// `system` field, everything else is concatenated into the prompt.
#[derive(Debug, Clone)]
pub struct OllamaLlm {
    model: String,
    base_url: String,
    temperature: Option<f64>,
}

impl OllamaLlm {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            temperature: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
impl ChatModel for OllamaLlm {
    fn provider_name(&self) -> &'static str {
        "ollama"
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

        let system: Vec<&str> = messages
            .iter()
            .filter_map(|m| match m {
                BaseMessage::System(s) => Some(s.content.as_str()),
                _ => None,
            })
            .collect();
        let prompt: Vec<&str> = messages
            .iter()
            .filter_map(|m| match m {
                BaseMessage::System(_) => None,
                other => Some(other.content()),
            })
            .collect();

        let mut payload = json!({
            "model": model,
            "prompt": prompt.join("\n\n"),
            "stream": false,
            "options": build_options(self.temperature, options),
        });
        let obj = payload.as_object_mut().expect("payload is an object");
        if !system.is_empty() {
            obj.insert("system".into(), json!(system.join("\n")));
        }
        if options.format.as_deref() == Some("json") {
            obj.insert("format".into(), json!("json"));
        }

        let client = build_client()?;
        let request = client
            .post(format!("{}/api/generate", self.base_url))
            .header("Content-Type", "application/json");

        let response = post_json(request, &payload).await?;

        let content = response
            .get("response")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_response("missing 'response' field"))?
            .to_string();

        let mut message = AIMessage::new(content);
        message.usage = parse_usage(&response);
        Ok(ChatResult::new(message))
    }
}

fn build_options(default_temperature: Option<f64>, options: &CallOptions) -> Value {
    let mut opts = serde_json::Map::new();
    if let Some(t) = options.temperature.or(default_temperature) {
        opts.insert("temperature".into(), json!(t));
    }
    if let Some(num_ctx) = options.num_ctx {
        opts.insert("num_ctx".into(), json!(num_ctx));
    }
    if let Some(max) = options.max_tokens {
        opts.insert("num_predict".into(), json!(max));
    }
    Value::Object(opts)
}

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
                                "function": {"name": c.name, "arguments": c.arguments},
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
            BaseMessage::Tool(m) => json!({"role": "tool", "content": m.content}),
        })
        .collect()
}

fn parse_chat_response(response: &Value) -> Result<AIMessage> {
    let message = response
        .get("message")
        .ok_or_else(|| Error::invalid_response("missing 'message' field"))?;

    let content = message
        .get("content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    // Ollama does not assign call ids; synthesize stable ones.
    let tool_calls = message
        .get("tool_calls")
        .and_then(Value::as_array)
        .map(|calls| {
            calls
                .iter()
                .enumerate()
                .filter_map(|(i, call)| {
                    let function = call.get("function")?;
                    let name = function.get("name").and_then(Value::as_str)?.to_string();
                    let arguments = function.get("arguments").cloned().unwrap_or(json!({}));
                    Some(ToolCall {
                        id: format!("call_{i}"),
                        name,
                        arguments,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(AIMessage {
        content,
        tool_calls,
        usage: parse_usage(response),
    })
}

fn parse_usage(response: &Value) -> Option<UsageMetadata> {
    let input = response.get("prompt_eval_count").and_then(Value::as_u64);
    let output = response.get("eval_count").and_then(Value::as_u64);
    if input.is_none() && output.is_none() {
        return None;
    }
    let input = input.unwrap_or(0);
    let output = output.unwrap_or(0);
    Some(UsageMetadata {
        input_tokens: input,
        output_tokens: output,
        total_tokens: input + output,
    })
}
