use thiserror::Error;

use crate::validation::FieldError;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("Email already exists")]
    Conflict,
    #[error("Email address doesn't exist")]
    NotFound,
    #[error("Incorrect Password")]
    Unauthorized,
    #[error("domains unavailable")]
    DomainsUnavailable,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl AuthError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            AuthError::Validation(_) => 1001,
            AuthError::Conflict => 1002,
            AuthError::NotFound => 1003,
            AuthError::Unauthorized => 1004,
            AuthError::DomainsUnavailable => 1005,
            AuthError::HashError(_) => 1101,
            AuthError::TokenError(_) => 1102,
            AuthError::Repository(_) => 1200,
        }
    }
}

impl From<crate::errors::ServiceError> for AuthError {
    fn from(e: crate::errors::ServiceError) -> Self {
        match e {
            crate::errors::ServiceError::Validation(errs) => AuthError::Validation(errs),
            other => AuthError::Repository(other.to_string()),
        }
    }
}
