//! Message types for LLM conversations.
//!
//! A conversation is a flat list of [`BaseMessage`] values. Providers map
//! these onto their own wire formats; tool calls requested by the model are
//! carried on [`AIMessage`] and answered with [`ToolMessage`].

use serde::{Deserialize, Serialize};

use crate::chat_models::UsageMetadata;

/// A single tool invocation requested by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back in the tool result.
    pub id: String,
    pub name: String,
    /// Arguments as a JSON object.
    pub arguments: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemMessage {
    pub content: String,
}

impl SystemMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HumanMessage {
    pub content: String,
}

impl HumanMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AIMessage {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageMetadata>,
}

impl AIMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Result of executing one tool call, fed back to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolMessage {
    pub content: String,
    pub tool_call_id: String,
    pub name: String,
}

impl ToolMessage {
    pub fn new(
        content: impl Into<String>,
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum BaseMessage {
    System(SystemMessage),
    Human(HumanMessage),
    #[serde(rename = "ai")]
    AI(AIMessage),
    Tool(ToolMessage),
}

impl BaseMessage {
    /// Text content of the message, regardless of variant.
    pub fn content(&self) -> &str {
        match self {
            BaseMessage::System(m) => &m.content,
            BaseMessage::Human(m) => &m.content,
            BaseMessage::AI(m) => &m.content,
            BaseMessage::Tool(m) => &m.content,
        }
    }
}

impl From<SystemMessage> for BaseMessage {
    fn from(m: SystemMessage) -> Self {
        BaseMessage::System(m)
    }
}

impl From<HumanMessage> for BaseMessage {
    fn from(m: HumanMessage) -> Self {
        BaseMessage::Human(m)
    }
}

impl From<AIMessage> for BaseMessage {
    fn from(m: AIMessage) -> Self {
        BaseMessage::AI(m)
    }
}

impl From<ToolMessage> for BaseMessage {
    fn from(m: ToolMessage) -> Self {
        BaseMessage::Tool(m)
    }
}
