//! Anthropic messages-API provider.

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{build_client, post_json};
use crate::chat_models::{CallOptions, ChatModel, ChatResult, UsageMetadata};
use crate::error::{Error, Result};
use crate::messages::{AIMessage, BaseMessage, ToolCall};

pub const DEFAULT_API_BASE: &str = "https://api.anthropic.com";

/// `max_tokens` is mandatory on the messages API.
const DEFAULT_MAX_TOKENS: i32 = 1024;

#[derive(Debug, Clone)]
pub struct ChatAnthropic {
    model: String,
    api_key: String,
    api_version: String,
    base_url: String,
    temperature: Option<f64>,
}

impl ChatAnthropic {
    pub fn new(
        model: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            api_version: api_version.into(),
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
impl ChatModel for ChatAnthropic {
    fn provider_name(&self) -> &'static str {
        "anthropic"
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

        let mut payload = json!({
            "model": model,
            "max_tokens": options.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            "messages": format_messages(messages),
        });
        let obj = payload.as_object_mut().expect("payload is an object");
        if !system.is_empty() {
            obj.insert("system".into(), json!(system.join("\n")));
        }
        if let Some(t) = options.temperature.or(self.temperature) {
            obj.insert("temperature".into(), json!(t));
        }
        if !options.tools.is_empty() {
            let tools: Vec<Value> = options
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "input_schema": t.parameters,
                    })
                })
                .collect();
            obj.insert("tools".into(), json!(tools));
        }

        let client = build_client()?;
        let request = client
            .post(format!("{}/v1/messages", self.base_url))
            .header("Content-Type", "application/json")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version);

        let response = post_json(request, &payload).await?;
        Ok(ChatResult::new(parse_response(&response)?))
    }
}

/// Convert to Anthropic's role/content-block format. System messages are
/// hoisted to the top-level `system` field by the caller; consecutive tool
/// results are merged into a single user turn as the API requires.
fn format_messages(messages: &[BaseMessage]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();

    for message in messages {
        match message {
            BaseMessage::System(_) => {}
            BaseMessage::Human(m) => {
                out.push(json!({
                    "role": "user",
                    "content": [{"type": "text", "text": m.content}],
                }));
            }
            BaseMessage::AI(m) => {
                let mut blocks: Vec<Value> = Vec::new();
                if !m.content.is_empty() {
                    blocks.push(json!({"type": "text", "text": m.content}));
                }
                for call in &m.tool_calls {
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": call.id,
                        "name": call.name,
                        "input": call.arguments,
                    }));
                }
                out.push(json!({"role": "assistant", "content": blocks}));
            }
            BaseMessage::Tool(m) => {
                let block = json!({
                    "type": "tool_result",
                    "tool_use_id": m.tool_call_id,
                    "content": m.content,
                });
                let merged = out
                    .last_mut()
                    .filter(|last| {
                        last["role"] == "user"
                            && last["content"]
                                .as_array()
                                .and_then(|blocks| blocks.first())
                                .map(|b| b["type"] == "tool_result")
                                .unwrap_or(false)
                    })
                    .and_then(|last| last["content"].as_array_mut())
                    .map(|blocks| blocks.push(block.clone()))
                    .is_some();
                if !merged {
                    out.push(json!({"role": "user", "content": [block]}));
                }
            }
        }
    }

    out
}

fn parse_response(response: &Value) -> Result<AIMessage> {
    let blocks = response
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::invalid_response("missing 'content' blocks"))?;

    let mut content = String::new();
    let mut tool_calls = Vec::new();

    for block in blocks {
        match block.get("type").and_then(Value::as_str) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(Value::as_str) {
                    content.push_str(text);
                }
            }
            Some("tool_use") => {
                let id = block
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let name = block
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let arguments = block.get("input").cloned().unwrap_or(json!({}));
                tool_calls.push(ToolCall {
                    id,
                    name,
                    arguments,
                });
            }
            _ => {}
        }
    }

    let usage = response.get("usage").map(|u| {
        let input = u.get("input_tokens").and_then(Value::as_u64).unwrap_or(0);
        let output = u.get("output_tokens").and_then(Value::as_u64).unwrap_or(0);
        UsageMetadata {
            input_tokens: input,
            output_tokens: output,
            total_tokens: input + output,
        }
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
    use crate::messages::{HumanMessage, ToolMessage};

    #[test]
    fn test_consecutive_tool_results_are_merged() {
        let ai = AIMessage::new("").with_tool_calls(vec![
            ToolCall {
                id: "a".into(),
                name: "fetch_url".into(),
                arguments: json!({"url": "https://example.com"}),
            },
            ToolCall {
                id: "b".into(),
                name: "current_time".into(),
                arguments: json!({}),
            },
        ]);
        let messages: Vec<BaseMessage> = vec![
            HumanMessage::new("go").into(),
            ai.into(),
            ToolMessage::new("page text", "a", "fetch_url").into(),
            ToolMessage::new("2026-01-01T00:00:00Z", "b", "current_time").into(),
        ];
        let formatted = format_messages(&messages);
        assert_eq!(formatted.len(), 3);
        assert_eq!(formatted[2]["role"], "user");
        assert_eq!(formatted[2]["content"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_parse_response_mixed_blocks() {
        let response = json!({
            "content": [
                {"type": "text", "text": "thinking... "},
                {"type": "tool_use", "id": "tu_1", "name": "fetch_url",
                 "input": {"url": "https://example.com"}},
            ],
            "usage": {"input_tokens": 9, "output_tokens": 4}
        });
        let message = parse_response(&response).unwrap();
        assert_eq!(message.content, "thinking... ");
        assert_eq!(message.tool_calls[0].id, "tu_1");
        assert_eq!(message.usage.unwrap().total_tokens, 13);
    }
}
