//! Accumulating field validator used by request handlers and services.

use serde::Serialize;

use crate::errors::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self { field: field.to_string(), message: message.into() }
    }
}

/// Collects every failing check instead of stopping at the first one.
///
/// ```
/// use service::validation::Validator;
/// let mut v = Validator::new();
/// v.required("name", "").email("email", "nope");
/// assert_eq!(v.errors().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self { Self::default() }

    pub fn required(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.add(field, format!("{} is required", field));
        }
        self
    }

    pub fn min_length(&mut self, field: &str, value: &str, min: usize) -> &mut Self {
        if value.chars().count() < min {
            self.add(field, format!("{} must be at least {} characters", field, min));
        }
        self
    }

    /// Empty values are left to `required`.
    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !models::validation::is_valid_email(value) {
            self.add(field, "invalid email address");
        }
        self
    }

    pub fn domain_name(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.is_empty() && !models::validation::is_valid_domain_name(value.trim()) {
            self.add(field, "invalid domain name");
        }
        self
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.errors.push(FieldError::new(field, message));
        self
    }

    pub fn errors(&self) -> &[FieldError] { &self.errors }

    pub fn has_errors(&self) -> bool { !self.errors.is_empty() }

    pub fn finish(self) -> Result<(), ServiceError> {
        if self.errors.is_empty() { Ok(()) } else { Err(ServiceError::Validation(self.errors)) }
    }
}
