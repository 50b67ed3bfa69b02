use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request, rejection::JsonRejection},
    http::request::Parts,
};
use mathed_core::{AppError, FieldErrors};
use serde::de::DeserializeOwned;
use validator::Validate;

const REQUIRED_MESSAGE: &str = "This field is required.";

/// JSON body that has passed its `validator` rules.
///
/// Every failure is a 400: missing fields and values of the wrong type are
/// reported against the offending field, the same way rule violations are.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection_to_error)?;

        value
            .validate()
            .map_err(|errors| AppError::from_validation_errors(&errors))?;

        Ok(ValidatedJson(value))
    }
}

/// JSON body without `validator` rules, for handlers that validate in the
/// service. Rejections are mapped the same way as [`ValidatedJson`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPayload<T>(pub T);

impl<T, S> FromRequest<S> for JsonPayload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection_to_error)?;

        Ok(JsonPayload(value))
    }
}

fn json_rejection_to_error(rejection: JsonRejection) -> AppError {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request(anyhow::anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    let body = rejection.body_text();

    if let Some(field) = missing_field(&body) {
        let mut fields = FieldErrors::new();
        fields.insert(field.to_string(), vec![REQUIRED_MESSAGE.to_string()]);
        return AppError::validation_with_message(format!("{} is required", field), fields);
    }

    if matches!(rejection, JsonRejection::JsonDataError(_))
        && let Some(field) = error_path(&body)
    {
        return AppError::field(field, "Invalid value.");
    }

    AppError::bad_request(anyhow::anyhow!("Invalid request body"))
}

/// Pulls `email` out of "... missing field `email` at line 1 column 2".
fn missing_field(message: &str) -> Option<&str> {
    message
        .split("missing field `")
        .nth(1)
        .and_then(|rest| rest.split('`').next())
        .filter(|field| !field.is_empty())
}

/// axum reports data errors as "<prefix>: <path>: <detail>" when the error
/// sits below the root; returns `<path>` in that case.
fn error_path(message: &str) -> Option<&str> {
    let (_, rest) = message.split_once("target type: ")?;
    let (path, _) = rest.split_once(": ")?;
    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    is_path.then_some(path)
}

/// Query string extractor whose rejection is a JSON 400 like every other error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                AppError::bad_request(anyhow::anyhow!(
                    "Invalid query parameters: {}",
                    rejection.body_text()
                ))
            })?;

        Ok(ValidatedQuery(value))
    }
}
