//! Compile-time tool registry for agent mode.
//!
//! Tools are statically linked and resolved by a stable name through
//! [`resolve_tool`]; there is no runtime plugin loading. The database tool
//! registry only records visibility/enablement for the backoffice, it cannot
//! introduce code.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A tool's definition as advertised to providers for function calling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema for the tool's parameters.
    pub parameters: Value,
}

/// A callable tool available to agent invocations.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema for the tool's arguments object.
    fn parameters(&self) -> Value;

    async fn call(&self, args: Value) -> Result<String>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Names of all statically registered tools.
pub fn builtin_tool_names() -> &'static [&'static str] {
    &["fetch_url", "current_time"]
}

/// Resolve a tool name to its statically linked implementation.
pub fn resolve_tool(name: &str) -> Option<Arc<dyn Tool>> {
    match name {
        "fetch_url" => Some(Arc::new(FetchUrl)),
        "current_time" => Some(Arc::new(CurrentTime)),
        _ => None,
    }
}

/// Maximum characters of extracted page text returned by `fetch_url`.
const FETCH_TEXT_LIMIT: usize = 16_384;

/// Fetches a URL and returns its readable text content.
#[derive(Debug, Clone, Copy)]
pub struct FetchUrl;

#[async_trait]
impl Tool for FetchUrl {
    fn name(&self) -> &'static str {
        "fetch_url"
    }

    fn description(&self) -> &'static str {
        "Fetch a web page and return its readable text content. \
         Use this to inspect the content behind a URL."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http(s) URL to fetch"
                }
            },
            "required": ["url"]
        })
    }

    async fn call(&self, args: Value) -> Result<String> {
        let url = args
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::tool(self.name(), "missing required argument 'url'"))?;

        let parsed = url::Url::parse(url)
            .map_err(|e| Error::tool(self.name(), format!("invalid url '{url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::tool(
                self.name(),
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        tracing::debug!("fetch_url: GET {}", parsed);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()?;
        let response = client.get(parsed).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::tool(
                self.name(),
                format!("request failed with status {status}"),
            ));
        }

        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.contains("text/html"))
            .unwrap_or(false);
        let body = response.text().await?;

        let mut text = if is_html { extract_text(&body) } else { body };
        if text.len() > FETCH_TEXT_LIMIT {
            let mut cut = FETCH_TEXT_LIMIT;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        Ok(text)
    }
}

/// Strip markup and scripts, keeping visible text.
fn extract_text(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    let selector = scraper::Selector::parse("body").expect("static selector");

    let root = document.select(&selector).next();
    let text: Vec<&str> = match &root {
        Some(body) => body.text().collect(),
        None => document.root_element().text().collect(),
    };

    text.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the current UTC time, RFC 3339.
#[derive(Debug, Clone, Copy)]
pub struct CurrentTime;

#[async_trait]
impl Tool for CurrentTime {
    fn name(&self) -> &'static str {
        "current_time"
    }

    fn description(&self) -> &'static str {
        "Return the current date and time in UTC (RFC 3339)."
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn call(&self, _args: Value) -> Result<String> {
        Ok(chrono::Utc::now().to_rfc3339())
    }
}
