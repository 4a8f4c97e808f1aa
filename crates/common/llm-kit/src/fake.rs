//! Scripted chat model for tests.
//!
//! Returns pre-seeded responses in order (repeating the last one once the
//! script is exhausted) and records every call, so handler tests can assert
//! both what reached the model and that nothing did.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::chat_models::{CallOptions, ChatModel, ChatResult};
use crate::error::{Error, Result};
use crate::messages::{AIMessage, BaseMessage};
use crate::provider::Provider;
use crate::registry::ModelFactory;

#[derive(Debug)]
struct FakeInner {
    responses: Vec<AIMessage>,
    index: AtomicUsize,
    calls: Mutex<Vec<Vec<BaseMessage>>>,
    options_seen: Mutex<Vec<CallOptions>>,
}

#[derive(Debug, Clone)]
pub struct FakeChatModel {
    inner: Arc<FakeInner>,
}

impl FakeChatModel {
    pub fn new(responses: Vec<AIMessage>) -> Self {
        Self {
            inner: Arc::new(FakeInner {
                responses,
                index: AtomicUsize::new(0),
                calls: Mutex::new(Vec::new()),
                options_seen: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.lock().len()
    }

    /// Message lists passed to `generate`, in call order.
    pub fn calls(&self) -> Vec<Vec<BaseMessage>> {
        self.inner.calls.lock().clone()
    }

    /// Options passed to `generate`, in call order.
    pub fn options_seen(&self) -> Vec<CallOptions> {
        self.inner.options_seen.lock().clone()
    }
}

#[async_trait]
impl ChatModel for FakeChatModel {
    fn provider_name(&self) -> &'static str {
        "fake"
    }

    fn model_name(&self) -> &str {
        "fake-chat-model"
    }

    async fn generate(
        &self,
        messages: &[BaseMessage],
        options: &CallOptions,
    ) -> Result<ChatResult> {
        self.inner.calls.lock().push(messages.to_vec());
        self.inner.options_seen.lock().push(options.clone());

        let index = self.inner.index.fetch_add(1, Ordering::SeqCst);
        let message = self
            .inner
            .responses
            .get(index)
            .or_else(|| self.inner.responses.last())
            .cloned()
            .ok_or_else(|| Error::invalid_response("fake model has no scripted responses"))?;
        Ok(ChatResult::new(message))
    }
}

/// `ModelFactory` handing out clones of one shared [`FakeChatModel`].
#[derive(Debug, Clone)]
pub struct FakeModelFactory {
    model: FakeChatModel,
    providers_seen: Arc<Mutex<Vec<Provider>>>,
}

impl FakeModelFactory {
    pub fn new(model: FakeChatModel) -> Self {
        Self {
            model,
            providers_seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn providers_seen(&self) -> Vec<Provider> {
        self.providers_seen.lock().clone()
    }
}

impl ModelFactory for FakeModelFactory {
    fn model(&self, provider: Provider, _options: &CallOptions) -> Result<Box<dyn ChatModel>> {
        self.providers_seen.lock().push(provider);
        Ok(Box::new(self.model.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fake_replays_script_then_repeats_last() {
        let fake = FakeChatModel::new(vec![AIMessage::new("one"), AIMessage::new("two")]);
        for expected in ["one", "two", "two"] {
            let result = fake.generate(&[], &CallOptions::default()).await.unwrap();
            assert_eq!(result.message.content, expected);
        }
        assert_eq!(fake.call_count(), 3);
    }

    #[tokio::test]
    async fn test_factory_records_provider() {
        let factory = FakeModelFactory::new(FakeChatModel::new(vec![AIMessage::new("x")]));
        factory
            .model(Provider::OllamaChat, &CallOptions::default())
            .unwrap();
        assert_eq!(factory.providers_seen(), vec![Provider::OllamaChat]);
    }
}
