use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, warn};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    #[error("Prompt composition failed: {0}")]
    Compose(#[from] prompt_kit::PromptKitError),

    #[error(transparent)]
    Invocation(#[from] llm_kit::Error),
}

impl FeatureError {
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

impl IntoResponse for FeatureError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            FeatureError::MissingField(field) => {
                warn!("Missing required field: {}", field);
                (
                    StatusCode::BAD_REQUEST,
                    "missing_field",
                    "Missing required field",
                    Some(format!("Field '{}' is required for this feature", field)),
                )
            }
            FeatureError::InvalidField { field, reason } => {
                warn!("Invalid field '{}': {}", field, reason);
                (
                    StatusCode::BAD_REQUEST,
                    "invalid_field",
                    "Invalid field value",
                    Some(format!("Field '{}': {}", field, reason)),
                )
            }
            FeatureError::Compose(e) => {
                error!("Prompt composition failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                    None,
                )
            }
            // The upstream detail stays in the log, not in the body.
            FeatureError::Invocation(e) => {
                error!("Model invocation failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: error_code.to_string(),
            message: message.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}
