use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, warn};
use vc_remote_db::DbError;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BackofficeError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl BackofficeError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl IntoResponse for BackofficeError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match &self {
            BackofficeError::Validation(msg) => {
                warn!("Invalid backoffice request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    "invalid_request",
                    "Invalid request",
                    Some(msg.clone()),
                )
            }
            BackofficeError::Db(db) if db.is_not_found() => {
                warn!("Entity not found: {}", db);
                (
                    StatusCode::NOT_FOUND,
                    "not_found",
                    "Entity not found",
                    Some(db.to_string()),
                )
            }
            BackofficeError::Db(db) if db.is_duplicate() => {
                warn!("Duplicate entity: {}", db);
                (
                    StatusCode::CONFLICT,
                    "duplicate",
                    "Entity already exists",
                    Some(db.to_string()),
                )
            }
            BackofficeError::Db(db) if db.is_foreign_key() => {
                warn!("Referential integrity violation: {}", db);
                (
                    StatusCode::CONFLICT,
                    "referential_integrity",
                    "Referential integrity violation",
                    Some(db.to_string()),
                )
            }
            BackofficeError::Db(DbError::InvalidInput(msg)) => {
                warn!("Invalid input: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    "invalid_request",
                    "Invalid request",
                    Some(msg.clone()),
                )
            }
            BackofficeError::Db(db) => {
                error!("Database operation failed: {}", db);
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

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn not_found_maps_to_404() {
        let err = BackofficeError::from(DbError::not_found("agent config"));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn duplicate_and_foreign_key_map_to_409() {
        let dup = BackofficeError::from(DbError::duplicate("name", "chat"));
        assert_eq!(dup.into_response().status(), StatusCode::CONFLICT);

        let fk = BackofficeError::from(DbError::ForeignKeyViolation {
            constraint: "agent_configs_prompt_framework_id_fkey".to_string(),
        });
        assert_eq!(fk.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn validation_maps_to_400() {
        let err = BackofficeError::validation("name must not be empty");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
