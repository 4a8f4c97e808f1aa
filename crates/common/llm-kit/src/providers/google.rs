//! Google Generative Language API provider (Gemini).

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{build_client, post_json};
use crate::chat_models::{CallOptions, ChatModel, ChatResult, UsageMetadata};
use crate::error::{Error, Result};
use crate::messages::{AIMessage, BaseMessage, ToolCall};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, Clone)]
pub struct ChatGoogle {
    model: String,
    api_key: String,
    base_url: String,
    temperature: Option<f64>,
}

impl ChatGoogle {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
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
impl ChatModel for ChatGoogle {
    fn provider_name(&self) -> &'static str {
        "google"
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
            "contents": format_contents(messages),
        });
        let obj = payload.as_object_mut().expect("payload is an object");
        if !system.is_empty() {
            obj.insert(
                "system_instruction".into(),
                json!({"parts": [{"text": system.join("\n")}]}),
            );
        }

        let mut generation_config = serde_json::Map::new();
        if let Some(t) = options.temperature.or(self.temperature) {
            generation_config.insert("temperature".into(), json!(t));
        }
        if let Some(max) = options.max_tokens {
            generation_config.insert("maxOutputTokens".into(), json!(max));
        }
        if options.format.as_deref() == Some("json") {
            generation_config.insert("responseMimeType".into(), json!("application/json"));
        }
        if !generation_config.is_empty() {
            obj.insert("generationConfig".into(), Value::Object(generation_config));
        }

        if !options.tools.is_empty() {
            let declarations: Vec<Value> = options
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    })
                })
                .collect();
            obj.insert(
                "tools".into(),
                json!([{"functionDeclarations": declarations}]),
            );
        }

        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let client = build_client()?;
        let request = client
            .post(url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key);

        let response = post_json(request, &payload).await?;
        Ok(ChatResult::new(parse_response(&response)?))
    }
}

fn format_contents(messages: &[BaseMessage]) -> Vec<Value> {
    messages
        .iter()
        .filter_map(|message| match message {
            BaseMessage::System(_) => None,
            BaseMessage::Human(m) => Some(json!({
                "role": "user",
                "parts": [{"text": m.content}],
            })),
            BaseMessage::AI(m) => {
                let mut parts: Vec<Value> = Vec::new();
                if !m.content.is_empty() {
                    parts.push(json!({"text": m.content}));
                }
                for call in &m.tool_calls {
                    parts.push(json!({
                        "functionCall": {"name": call.name, "args": call.arguments},
                    }));
                }
                Some(json!({"role": "model", "parts": parts}))
            }
            BaseMessage::Tool(m) => Some(json!({
                "role": "user",
                "parts": [{
                    "functionResponse": {
                        "name": m.name,
                        "response": {"result": m.content},
                    },
                }],
            })),
        })
        .collect()
}

fn parse_response(response: &Value) -> Result<AIMessage> {
    let parts = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::invalid_response("missing candidates[0].content.parts"))?;

    let mut content = String::new();
    let mut tool_calls = Vec::new();

    for (i, part) in parts.iter().enumerate() {
        if let Some(text) = part.get("text").and_then(Value::as_str) {
            content.push_str(text);
        }
        if let Some(call) = part.get("functionCall") {
            let name = call
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let arguments = call.get("args").cloned().unwrap_or(json!({}));
            // The API does not assign call ids.
            tool_calls.push(ToolCall {
                id: format!("call_{i}"),
                name,
                arguments,
            });
        }
    }

    let usage = response.get("usageMetadata").map(|u| UsageMetadata {
        input_tokens: u
            .get("promptTokenCount")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        output_tokens: u
            .get("candidatesTokenCount")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        total_tokens: u
            .get("totalTokenCount")
            .and_then(Value::as_u64)
            .unwrap_or(0),
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
    fn test_system_messages_excluded_from_contents() {
        let messages: Vec<BaseMessage> = vec![
            SystemMessage::new("sys").into(),
            HumanMessage::new("question").into(),
        ];
        let contents = format_contents(&messages);
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");
    }

    #[test]
    fn test_tool_result_becomes_function_response() {
        let messages: Vec<BaseMessage> =
            vec![ToolMessage::new("out", "call_0", "current_time").into()];
        let contents = format_contents(&messages);
        assert_eq!(
            contents[0]["parts"][0]["functionResponse"]["name"],
            "current_time"
        );
    }

    #[test]
    fn test_parse_response_function_call() {
        let response = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"functionCall": {"name": "fetch_url",
                                          "args": {"url": "https://example.com"}}},
                    ]
                }
            }],
            "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 2,
                              "totalTokenCount": 7}
        });
        let message = parse_response(&response).unwrap();
        assert_eq!(message.tool_calls.len(), 1);
        assert_eq!(message.tool_calls[0].name, "fetch_url");
        assert_eq!(message.usage.unwrap().total_tokens, 7);
    }
}
