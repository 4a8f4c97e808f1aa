//! prompt-kit - system prompt assembly from the context store.
//!
//! A context is a directory holding one plain-text file per prompt section
//! (`prompt.ruolo`, `prompt.obiettivo`, `prompt.azione`, `prompt.contesto`).
//! [`ContextStore`] reads them in that fixed order and concatenates the
//! contents into one system prompt. No caching: every call re-reads from
//! disk.

mod composer;
mod error;

pub use composer::{ContextStore, SECTION_KEYS};
pub use error::PromptKitError;

pub type Result<T> = std::result::Result<T, PromptKitError>;
