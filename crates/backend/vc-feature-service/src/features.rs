//! Static feature table.
//!
//! A feature names the context directory its system prompt comes from, the
//! fields the request must carry, an optional preprocessor run before prompt
//! composition, and the tool set bound in agent mode. The table is fixed at
//! compile time; routes are generated from it at startup.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::{error::FeatureError, types::DataRequest};

const CLICKBAIT_NUM_CTX: u32 = 2040;
const CLICKBAIT_MAX_TOKEN: u32 = 8032;

type Preprocessor = fn(&mut DataRequest) -> Result<(), FeatureError>;

pub struct FeatureSpec {
    pub name: &'static str,
    /// Context directory under the store root.
    pub context: &'static str,
    /// Restrict composition to a single section instead of the full prompt.
    pub section: Option<&'static str>,
    pub requires_question: bool,
    pub requires_url: bool,
    pub preprocess: Option<Preprocessor>,
    /// Tool names bound in agent mode, resolved against the builtin registry.
    pub tools: &'static [&'static str],
}

pub const FEATURES: &[FeatureSpec] = &[
    FeatureSpec {
        name: "chat",
        context: "chat",
        section: None,
        requires_question: true,
        requires_url: false,
        preprocess: None,
        tools: &[],
    },
    FeatureSpec {
        name: "clickbaitscore",
        context: "clickbaitscore",
        section: None,
        requires_question: false,
        requires_url: true,
        preprocess: Some(preprocess_clickbaitscore),
        tools: &[],
    },
    FeatureSpec {
        name: "commentanalysis",
        context: "commentanalysis",
        section: Some("contesto"),
        requires_question: true,
        requires_url: false,
        preprocess: None,
        tools: &[],
    },
    FeatureSpec {
        name: "threatintel",
        context: "threatintel",
        section: None,
        requires_question: true,
        requires_url: false,
        preprocess: None,
        tools: &["fetch_url", "current_time"],
    },
];

impl FeatureSpec {
    /// Required-field check. Runs before any preprocessing or provider call.
    pub fn validate(&self, request: &DataRequest) -> Result<(), FeatureError> {
        if self.requires_question && request.question.trim().is_empty() {
            return Err(FeatureError::MissingField("question"));
        }
        if self.requires_url && request.url.as_deref().unwrap_or("").trim().is_empty() {
            return Err(FeatureError::MissingField("url"));
        }
        Ok(())
    }

    pub fn apply_preprocess(&self, request: &mut DataRequest) -> Result<(), FeatureError> {
        if let Some(preprocess) = self.preprocess {
            preprocess(request)?;
        }
        Ok(())
    }
}

/// The target URL arrives base64-encoded; the decoded URL becomes the
/// question. Scoring is stateless, so history append is always skipped.
fn preprocess_clickbaitscore(request: &mut DataRequest) -> Result<(), FeatureError> {
    let encoded = request.url.as_deref().unwrap_or("");
    let decoded = BASE64
        .decode(encoded.trim())
        .map_err(|e| FeatureError::invalid_field("url", format!("invalid base64: {e}")))?;
    let url = String::from_utf8(decoded)
        .map_err(|_| FeatureError::invalid_field("url", "decoded url is not valid UTF-8"))?;

    request.question = url;
    request.num_ctx.get_or_insert(CLICKBAIT_NUM_CTX);
    request.max_token.get_or_insert(CLICKBAIT_MAX_TOKEN);
    request.noappendchat = true;
    Ok(())
}

pub fn feature(name: &str) -> Option<&'static FeatureSpec> {
    FEATURES.iter().find(|f| f.name == name)
}
