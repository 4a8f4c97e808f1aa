use std::sync::Arc;

use llm_kit::{ChatMemory, ModelFactory};
use prompt_kit::ContextStore;

/// Shared dependencies of every feature handler.
#[derive(Clone)]
pub struct AppState {
    pub composer: Arc<ContextStore>,
    pub factory: Arc<dyn ModelFactory>,
    pub memory: ChatMemory,
}

impl AppState {
    pub fn new(
        composer: Arc<ContextStore>,
        factory: Arc<dyn ModelFactory>,
        memory: ChatMemory,
    ) -> Self {
        Self {
            composer,
            factory,
            memory,
        }
    }
}
