use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::SliderError;
use serde::Serialize;
use thiserror::Error;

/// Error returned by JSON endpoints and the admin guard.
///
/// Admin page failures are rendered as alerts instead; see `routes::admin`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed")]
    ValidationList(Vec<String>),

    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut details = None;
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::ValidationList(messages) => {
                details = Some(messages.clone());
                let message = if messages.len() == 1 {
                    messages[0].clone()
                } else {
                    format!("{} validation errors", messages.len())
                };
                (StatusCode::BAD_REQUEST, "validation_error", message)
            }
            ApiError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                msg.clone(),
            ),
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        let code = match &err {
            sqlx::Error::RowNotFound => {
                return ApiError::NotFound("Slide or setting not found".into())
            }
            sqlx::Error::Database(db_err) => db_err.code().map(|c| c.into_owned()),
            _ => None,
        };
        match code.as_deref() {
            // unique_violation: a slide/shop pair or setting row already exists
            Some("23505") => ApiError::Conflict("Slide association already exists".into()),
            // foreign_key_violation: slide rows reference a removed slide
            Some("23503") => ApiError::NotFound("Referenced slide does not exist".into()),
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    e.message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}.", field))
                })
            })
            .collect();

        ApiError::ValidationList(messages)
    }
}

impl From<SliderError> for ApiError {
    fn from(err: SliderError) -> Self {
        match err {
            SliderError::Validation(messages) => ApiError::ValidationList(messages),
            SliderError::InvalidUpload(msg) => ApiError::Validation(msg),
            SliderError::InvalidId(_) => ApiError::Validation(err.to_string()),
            SliderError::NotFound(_) => ApiError::NotFound(err.to_string()),
            SliderError::ShopContext(msg) => ApiError::Forbidden(msg),
            SliderError::ShopAssociation(_) | SliderError::Persistence(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}
