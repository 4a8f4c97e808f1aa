//! Bounded in-process conversation memory.
//!
//! History is keyed by the request's conversation key. Appends are skipped
//! entirely when a request carries `noappendchat`, so providers that manage
//! their own conversation state are not double-tracked.

use std::collections::HashMap;

use parking_lot::RwLock;
use std::sync::Arc;

use crate::messages::{AIMessage, BaseMessage, HumanMessage};

const DEFAULT_MAX_MESSAGES: usize = 20;

#[derive(Debug, Clone)]
pub struct ChatMemory {
    inner: Arc<RwLock<HashMap<String, Vec<BaseMessage>>>>,
    max_messages: usize,
}

impl Default for ChatMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_MESSAGES)
    }
}

impl ChatMemory {
    /// `max_messages` bounds the retained history per conversation key;
    /// oldest messages are dropped first.
    pub fn new(max_messages: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            max_messages: max_messages.max(2),
        }
    }

    pub fn history(&self, key: &str) -> Vec<BaseMessage> {
        self.inner.read().get(key).cloned().unwrap_or_default()
    }

    /// Append one (question, answer) exchange to the conversation.
    pub fn append(&self, key: &str, question: &str, answer: &str) {
        let mut map = self.inner.write();
        let entry = map.entry(key.to_string()).or_default();
        entry.push(HumanMessage::new(question).into());
        entry.push(AIMessage::new(answer).into());
        if entry.len() > self.max_messages {
            let excess = entry.len() - self.max_messages;
            entry.drain(..excess);
        }
    }

    pub fn clear(&self, key: &str) {
        self.inner.write().remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_history() {
        let memory = ChatMemory::default();
        assert!(memory.history("chat-1").is_empty());

        memory.append("chat-1", "hi", "hello");
        let history = memory.history("chat-1");
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content(), "hi");
        assert_eq!(history[1].content(), "hello");

        // Other keys are independent.
        assert!(memory.history("chat-2").is_empty());
    }

    #[test]
    fn test_history_is_bounded() {
        let memory = ChatMemory::new(4);
        for i in 0..10 {
            memory.append("k", &format!("q{i}"), &format!("a{i}"));
        }
        let history = memory.history("k");
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].content(), "q8");
        assert_eq!(history[3].content(), "a9");
    }

    #[test]
    fn test_clear() {
        let memory = ChatMemory::default();
        memory.append("k", "q", "a");
        memory.clear("k");
        assert!(memory.history("k").is_empty());
    }
}
