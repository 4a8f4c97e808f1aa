use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("provider {provider} not configured: missing {variable}")]
    NotConfigured {
        provider: &'static str,
        variable: &'static str,
    },

    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    #[error("tool {name} failed: {message}")]
    Tool { name: String, message: String },

    #[error("agent exceeded {0} tool iterations without a final answer")]
    ToolLoop(usize),
}

impl Error {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn not_configured(provider: &'static str, variable: &'static str) -> Self {
        Self::NotConfigured { provider, variable }
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn tool(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Tool {
            name: name.into(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
