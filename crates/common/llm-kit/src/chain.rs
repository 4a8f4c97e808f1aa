//! Chain and agent invocation over a composed system prompt.
//!
//! A `Chain` is a single request/response call without tools. An `Agent`
//! binds a set of tools and loops while the model keeps requesting tool
//! calls, up to a bounded number of iterations. Neither retries a failed
//! provider call.

use std::sync::Arc;

use serde::Serialize;

use crate::chat_models::{CallOptions, ChatModel, UsageMetadata};
use crate::error::{Error, Result};
use crate::memory::ChatMemory;
use crate::messages::{BaseMessage, HumanMessage, SystemMessage, ToolMessage};
use crate::tools::Tool;

const DEFAULT_MAX_ITERATIONS: usize = 5;

/// Per-call input envelope.
#[derive(Debug, Clone)]
pub struct ChainRequest {
    /// Conversation key for history lookup/append.
    pub chat_key: String,
    pub question: String,
    /// Skip the history append after answering. Forced true by features whose
    /// provider manages its own conversation memory.
    pub noappendchat: bool,
}

/// One executed tool step, reported back in the response trace.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    pub tool: String,
    pub arguments: serde_json::Value,
    pub output: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainResponse {
    pub result: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<AgentStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageMetadata>,
}

/// Bare chain invocation: [system, history..., question] in, answer out.
pub struct Chain {
    model: Box<dyn ChatModel>,
    memory: ChatMemory,
}

impl Chain {
    pub fn new(model: Box<dyn ChatModel>, memory: ChatMemory) -> Self {
        Self { model, memory }
    }

    pub async fn invoke(
        &self,
        system_prompt: &str,
        request: &ChainRequest,
        options: &CallOptions,
    ) -> Result<ChainResponse> {
        let mut messages: Vec<BaseMessage> = vec![SystemMessage::new(system_prompt).into()];
        messages.extend(self.memory.history(&request.chat_key));
        messages.push(HumanMessage::new(&request.question).into());

        tracing::info!(
            provider = self.model.provider_name(),
            model = self.model.model_name(),
            chat_key = %request.chat_key,
            "invoking chain"
        );

        let result = self.model.generate(&messages, options).await?;
        let answer = result.message.content.clone();

        if !request.noappendchat {
            self.memory
                .append(&request.chat_key, &request.question, &answer);
        }

        Ok(ChainResponse {
            result: answer,
            trace: Vec::new(),
            usage: result.message.usage,
        })
    }
}

/// Tool-augmented invocation with a bounded tool loop.
pub struct Agent {
    model: Box<dyn ChatModel>,
    memory: ChatMemory,
    tools: Vec<Arc<dyn Tool>>,
    max_iterations: usize,
}

impl Agent {
    pub fn new(model: Box<dyn ChatModel>, memory: ChatMemory, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            model,
            memory,
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    fn tool(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub async fn invoke(
        &self,
        system_prompt: &str,
        request: &ChainRequest,
        options: &CallOptions,
    ) -> Result<ChainResponse> {
        let mut options = options.clone();
        options.tools = self.tools.iter().map(|t| t.definition()).collect();

        let mut messages: Vec<BaseMessage> = vec![SystemMessage::new(system_prompt).into()];
        messages.extend(self.memory.history(&request.chat_key));
        messages.push(HumanMessage::new(&request.question).into());

        tracing::info!(
            provider = self.model.provider_name(),
            model = self.model.model_name(),
            chat_key = %request.chat_key,
            tools = options.tools.len(),
            "invoking agent"
        );

        let mut trace: Vec<AgentStep> = Vec::new();
        let mut usage = UsageMetadata::default();
        let mut saw_usage = false;

        for _ in 0..self.max_iterations {
            let result = self.model.generate(&messages, &options).await?;
            if let Some(u) = &result.message.usage {
                usage.add(u);
                saw_usage = true;
            }

            if !result.message.has_tool_calls() {
                let answer = result.message.content;
                if !request.noappendchat {
                    self.memory
                        .append(&request.chat_key, &request.question, &answer);
                }
                return Ok(ChainResponse {
                    result: answer,
                    trace,
                    usage: saw_usage.then_some(usage),
                });
            }

            let tool_calls = result.message.tool_calls.clone();
            messages.push(BaseMessage::AI(result.message));

            for call in tool_calls {
                // A failing or unknown tool is reported to the model as tool
                // output, not raised to the caller.
                let output = match self.tool(&call.name) {
                    Some(tool) => {
                        tracing::debug!(tool = %call.name, "executing tool");
                        tool.call(call.arguments.clone())
                            .await
                            .unwrap_or_else(|e| format!("tool error: {e}"))
                    }
                    None => {
                        tracing::warn!(tool = %call.name, "model requested unknown tool");
                        format!("unknown tool: {}", call.name)
                    }
                };
                trace.push(AgentStep {
                    tool: call.name.clone(),
                    arguments: call.arguments.clone(),
                    output: output.clone(),
                });
                messages.push(ToolMessage::new(output, call.id, call.name).into());
            }
        }

        Err(Error::ToolLoop(self.max_iterations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeChatModel;
    use crate::messages::{AIMessage, ToolCall};
    use crate::tools::resolve_tool;
    use serde_json::json;

    #[tokio::test]
    async fn test_chain_appends_history() {
        let fake = FakeChatModel::new(vec![AIMessage::new("pong")]);
        let memory = ChatMemory::default();
        let chain = Chain::new(Box::new(fake.clone()), memory.clone());

        let request = ChainRequest {
            chat_key: "c1".into(),
            question: "ping".into(),
            noappendchat: false,
        };
        let response = chain
            .invoke("system", &request, &CallOptions::default())
            .await
            .unwrap();

        assert_eq!(response.result, "pong");
        assert_eq!(fake.call_count(), 1);
        assert_eq!(memory.history("c1").len(), 2);

        // The system prompt leads the message list.
        let calls = fake.calls();
        assert_eq!(calls[0][0].content(), "system");
    }

    #[tokio::test]
    async fn test_chain_noappendchat_skips_history() {
        let fake = FakeChatModel::new(vec![AIMessage::new("ok")]);
        let memory = ChatMemory::default();
        let chain = Chain::new(Box::new(fake), memory.clone());

        let request = ChainRequest {
            chat_key: "c2".into(),
            question: "q".into(),
            noappendchat: true,
        };
        chain
            .invoke("sys", &request, &CallOptions::default())
            .await
            .unwrap();
        assert!(memory.history("c2").is_empty());
    }

    #[tokio::test]
    async fn test_agent_tool_loop() {
        let scripted = vec![
            AIMessage::new("").with_tool_calls(vec![ToolCall {
                id: "call_0".into(),
                name: "current_time".into(),
                arguments: json!({}),
            }]),
            AIMessage::new("it is late"),
        ];
        let fake = FakeChatModel::new(scripted);
        let agent = Agent::new(
            Box::new(fake.clone()),
            ChatMemory::default(),
            vec![resolve_tool("current_time").unwrap()],
        );

        let request = ChainRequest {
            chat_key: "a1".into(),
            question: "what time is it?".into(),
            noappendchat: true,
        };
        let response = agent
            .invoke("sys", &request, &CallOptions::default())
            .await
            .unwrap();

        assert_eq!(response.result, "it is late");
        assert_eq!(response.trace.len(), 1);
        assert_eq!(response.trace[0].tool, "current_time");
        assert_eq!(fake.call_count(), 2);

        // Second call carried the tool result back to the model.
        let calls = fake.calls();
        let last = calls[1].last().unwrap();
        assert!(matches!(last, BaseMessage::Tool(_)));
    }

    #[tokio::test]
    async fn test_agent_unknown_tool_reported_not_raised() {
        let scripted = vec![
            AIMessage::new("").with_tool_calls(vec![ToolCall {
                id: "call_0".into(),
                name: "does_not_exist".into(),
                arguments: json!({}),
            }]),
            AIMessage::new("done"),
        ];
        let agent = Agent::new(
            Box::new(FakeChatModel::new(scripted)),
            ChatMemory::default(),
            vec![],
        );

        let request = ChainRequest {
            chat_key: "a2".into(),
            question: "q".into(),
            noappendchat: true,
        };
        let response = agent
            .invoke("sys", &request, &CallOptions::default())
            .await
            .unwrap();
        assert_eq!(response.result, "done");
        assert!(response.trace[0].output.contains("unknown tool"));
    }

    #[tokio::test]
    async fn test_agent_iteration_bound() {
        // Model that never stops asking for tools.
        let looping = AIMessage::new("").with_tool_calls(vec![ToolCall {
            id: "c".into(),
            name: "current_time".into(),
            arguments: json!({}),
        }]);
        let agent = Agent::new(
            Box::new(FakeChatModel::new(vec![looping])),
            ChatMemory::default(),
            vec![resolve_tool("current_time").unwrap()],
        )
        .max_iterations(3);

        let request = ChainRequest {
            chat_key: "a3".into(),
            question: "q".into(),
            noappendchat: true,
        };
        let err = agent
            .invoke("sys", &request, &CallOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ToolLoop(3)));
    }
}
