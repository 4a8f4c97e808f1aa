use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{PromptKitError, Result};

/// Prompt sections in composition order. The composed system prompt is the
/// concatenation of the section file contents, in exactly this order, with
/// no separator beyond what the files themselves contain.
pub const SECTION_KEYS: [&str; 4] = ["ruolo", "obiettivo", "azione", "contesto"];

/// Read-only view over the context directory tree.
///
/// One subdirectory per context name, each holding `prompt.<section>` files.
/// Deploying files is how contexts are created; nothing here mutates them.
#[derive(Debug, Clone)]
pub struct ContextStore {
    root: PathBuf,
}

impl ContextStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compose the full system prompt for a context.
    ///
    /// A missing section file fails the whole composition; there is no
    /// partial-prompt fallback.
    pub async fn compose_system_prompt(&self, context: &str) -> Result<String> {
        let dir = self.context_dir(context)?;
        let mut prompt = String::new();
        for key in SECTION_KEYS {
            prompt.push_str(&read_section(&dir, key).await?);
        }
        debug!(context, bytes = prompt.len(), "composed system prompt");
        Ok(prompt)
    }

    /// Read exactly one section of a context.
    pub async fn compose_section(&self, context: &str, section: &str) -> Result<String> {
        if !SECTION_KEYS.contains(&section) {
            return Err(PromptKitError::UnknownSection(section.to_string()));
        }
        let dir = self.context_dir(context)?;
        read_section(&dir, section).await
    }

    /// Context names must be a single path component.
    fn context_dir(&self, context: &str) -> Result<PathBuf> {
        if context.is_empty()
            || context.contains(['/', '\\'])
            || context == "."
            || context == ".."
        {
            return Err(PromptKitError::InvalidContext(context.to_string()));
        }
        Ok(self.root.join(context))
    }
}

async fn read_section(dir: &Path, key: &str) -> Result<String> {
    let path = dir.join(format!("prompt.{key}"));
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| PromptKitError::io(path, e))
}
