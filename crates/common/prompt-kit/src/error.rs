use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptKitError {
    #[error("invalid context name: {0}")]
    InvalidContext(String),

    #[error("unknown prompt section: {0}")]
    UnknownSection(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PromptKitError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
