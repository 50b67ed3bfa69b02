//! Application error type.
//!
//! Every fallible handler and service returns [`AppError`], which renders as
//! a JSON body of the form:
//!
//! ```json
//! { "error": "Passwords do not match.", "fields": { "password_confirm": ["Passwords do not match."] } }
//! ```
//!
//! The `fields` key is only present for validation errors.

use std::collections::BTreeMap;

use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Field name to list of messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Error body as documented in the OpenAPI schema.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[schema(value_type = Option<Object>)]
    pub fields: Option<FieldErrors>,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub error: Error,
    pub fields: Option<FieldErrors>,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            error: err.into(),
            fields: None,
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, anyhow::anyhow!(message.into()))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, anyhow::anyhow!(message.into()))
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::internal(anyhow::anyhow!(message.into()))
    }

    /// A 400 carrying per-field messages. The top-level message joins them.
    pub fn validation(fields: FieldErrors) -> Self {
        let summary = fields
            .values()
            .flatten()
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(summary),
            fields: Some(fields),
        }
    }

    /// A 400 with field errors and a top-level message of the caller's choosing.
    pub fn validation_with_message(message: impl Into<String>, fields: FieldErrors) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: anyhow::anyhow!(message.into()),
            fields: Some(fields),
        }
    }

    /// Shorthand for a validation error on a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![message.into()]);
        Self::validation(fields)
    }

    /// Converts `validator` output into a field-scoped 400.
    pub fn from_validation_errors(errors: &ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();

        for (field, field_errors) in errors.field_errors() {
            let messages = fields.entry(field.to_string()).or_default();
            for err in field_errors {
                let message = err
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field));
                messages.push(message);
            }
        }

        Self::validation(fields)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status.as_u16(), error = ?self.error, "Request failed");
        }

        let body = match self.fields {
            Some(fields) => json!({
                "error": self.error.to_string(),
                "fields": fields,
            }),
            None => json!({
                "error": self.error.to_string()
            }),
        };

        (self.status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

/// Accumulates semantic validation failures before anything is persisted.
#[derive(Debug, Default)]
pub struct FieldErrorsBuilder {
    errors: FieldErrors,
}

impl FieldErrorsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn extend(&mut self, field: &str, messages: impl IntoIterator<Item = String>) {
        for message in messages {
            self.add(field, message);
        }
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "Name is required."))]
        name: String,
        #[validate(range(min = 5, max = 8))]
        grade: i16,
    }

    #[test]
    fn test_field_error_status_and_body() {
        let err = AppError::field("email", "An account with this email already exists.");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(
            err.error.to_string(),
            "An account with this email already exists."
        );
        let fields = err.fields.unwrap();
        assert_eq!(fields["email"].len(), 1);
    }

    #[test]
    fn test_builder_empty_is_ok() {
        assert!(FieldErrorsBuilder::new().finish().is_ok());
    }

    #[test]
    fn test_builder_collects_multiple_fields() {
        let mut builder = FieldErrorsBuilder::new();
        builder.add("password", "This password is too common.");
        builder.add("password_confirm", "Passwords do not match.");
        assert!(builder.has("password"));

        let err = builder.finish().unwrap_err();
        let fields = err.fields.unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains_key("password_confirm"));
    }

    #[test]
    fn test_from_validation_errors_uses_custom_and_default_messages() {
        let sample = Sample {
            name: String::new(),
            grade: 12,
        };
        let errors = sample.validate().unwrap_err();
        let err = AppError::from_validation_errors(&errors);

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let fields = err.fields.unwrap();
        assert_eq!(fields["name"], vec!["Name is required.".to_string()]);
        assert_eq!(fields["grade"], vec!["grade is invalid".to_string()]);
    }

    #[test]
    fn test_unauthorized_has_no_fields() {
        let err = AppError::unauthorized("Invalid email or password.");
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert!(err.fields.is_none());
    }
}
