//! HTTP error response mapping.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;

use homectl_domain::error::{ControlError, ValidationError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
}

impl ErrorBody {
    fn message(message: String) -> Self {
        Self {
            message,
            property: None,
            value: None,
        }
    }
}

/// Maps [`ControlError`] and unreadable request bodies to an HTTP response
/// with appropriate status code.
#[derive(Debug)]
pub enum ApiError {
    Control(ControlError),
    /// The body was not JSON, or was sent without a JSON content type.
    Body(JsonRejection),
}

impl From<ControlError> for ApiError {
    fn from(err: ControlError) -> Self {
        Self::Control(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::Control(err.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            Self::Control(err) => err,
            Self::Body(rejection) => {
                tracing::debug!(status = %rejection.status(), "rejected request body");
                let body = ErrorBody {
                    message: rejection.body_text(),
                    property: Some("body".to_string()),
                    value: None,
                };
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
            }
        };
        let (status, body) = match &err {
            ControlError::Validation(err) => (StatusCode::UNPROCESSABLE_ENTITY, validation(err)),
            ControlError::NotFound(err) => {
                (StatusCode::NOT_FOUND, ErrorBody::message(err.to_string()))
            }
            ControlError::Vendor(err) => {
                tracing::warn!(error = %err, "vendor error");
                (StatusCode::BAD_GATEWAY, ErrorBody::message(err.to_string()))
            }
            ControlError::Remote(err) => {
                tracing::warn!(error = %err, "remote service error");
                (StatusCode::BAD_GATEWAY, ErrorBody::message(err.to_string()))
            }
            ControlError::Cascade(err) => {
                tracing::warn!(error = %err, "dependency cascade failed");
                (StatusCode::BAD_GATEWAY, ErrorBody::message(err.to_string()))
            }
            ControlError::DuplicateIdentifier(err) => {
                tracing::error!(error = %err, "unexpected store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::message("internal server error".to_string()),
                )
            }
            ControlError::Composition(err) => {
                tracing::error!(error = %err, "unexpected composition error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::message("internal server error".to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn validation(err: &ValidationError) -> ErrorBody {
    ErrorBody {
        message: err.to_string(),
        property: Some(err.property().to_string()),
        value: err.value().cloned(),
    }
}
