use serde::Deserialize;

fn default_chat_key() -> String {
    "default".to_string()
}

/// Per-call input envelope, discarded after the response.
#[derive(Debug, Clone, Deserialize)]
pub struct DataRequest {
    /// Conversation key for history lookup/append.
    #[serde(default = "default_chat_key")]
    pub chat_key: String,
    #[serde(default)]
    pub question: String,
    /// Base64-encoded target URL, required by the scoring features.
    pub url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub num_ctx: Option<u32>,
    pub max_token: Option<u32>,
    #[serde(default)]
    pub noappendchat: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_body_fills_defaults() {
        let req: DataRequest = serde_json::from_str(r#"{"question": "hi"}"#).unwrap();
        assert_eq!(req.chat_key, "default");
        assert_eq!(req.question, "hi");
        assert!(req.url.is_none());
        assert!(!req.noappendchat);
    }

    #[test]
    fn overrides_deserialize() {
        let req: DataRequest = serde_json::from_str(
            r#"{
                "chat_key": "session-1",
                "question": "hi",
                "model": "llama3.1",
                "temperature": 0.2,
                "num_ctx": 4096,
                "max_token": 512,
                "noappendchat": true
            }"#,
        )
        .unwrap();
        assert_eq!(req.chat_key, "session-1");
        assert_eq!(req.model.as_deref(), Some("llama3.1"));
        assert_eq!(req.num_ctx, Some(4096));
        assert_eq!(req.max_token, Some(512));
        assert!(req.noappendchat);
    }
}
