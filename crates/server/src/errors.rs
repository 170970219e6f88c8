use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;

use service::auth::errors::AuthError;
use service::errors::ServiceError;
use service::upload::UploadError;
use models::errors::ModelError;

/// JSON error body: `{message, error?, errors?}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub error: Option<String>,
    pub errors: Option<Value>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a Value>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, error: Option<String>) -> Self {
        Self { status, message: message.into(), error, errors: None }
    }

    pub fn with_errors(mut self, errors: impl Serialize) -> Self {
        self.errors = serde_json::to_value(errors).ok();
        self
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, None)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message, None)
    }

    pub fn unauthenticated() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthenticated", None)
    }

    /// 500 with the detail kept in the log only.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        error!(error = %detail, "internal error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { message: &self.message, error: self.error.as_deref(), errors: self.errors.as_ref() };
        (self.status, Json(body)).into_response()
    }
}

impl From<UploadError> for JsonApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::Rejected(errs) => JsonApiError::bad_request("validation field").with_errors(errs),
            UploadError::Decode(msg) => JsonApiError::new(StatusCode::BAD_REQUEST, "Failed to upload image", Some(msg)),
            other => JsonApiError::internal(other),
        }
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(errs) => JsonApiError::bad_request("validation field").with_errors(errs),
            ServiceError::NotFound(msg) => JsonApiError::not_found(msg),
            ServiceError::Conflict(msg) | ServiceError::Model(ModelError::Conflict(msg)) => JsonApiError::bad_request(msg),
            ServiceError::Upload(u) => u.into(),
            ServiceError::Model(ModelError::Validation(msg)) => JsonApiError::bad_request(msg),
            ServiceError::Model(ModelError::NotFound(msg)) => JsonApiError::not_found(msg),
            other => JsonApiError::internal(other),
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(errs) => JsonApiError::bad_request("validation field").with_errors(errs),
            AuthError::Conflict | AuthError::Unauthorized => JsonApiError::bad_request(e.to_string()),
            AuthError::NotFound => JsonApiError::not_found(e.to_string()),
            AuthError::DomainsUnavailable => JsonApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Domains unavailable",
                Some("none of the user's domains could be resolved".into()),
            ),
            other => {
                let code = other.code();
                error!(code, error = %other, "auth failure");
                JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("cache unreachable: {0}")]
    Cache(String),
}
