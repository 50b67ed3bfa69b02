use anyhow::Context;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use axum_extra::extract::CookieJar;
use mathed_auth::{Claims, verify_token};
use mathed_config::cookie::ACCESS_COOKIE_NAME;
use mathed_core::AppError;
use mathed_models::UserType;
use uuid::Uuid;

use crate::state::AppState;

/// Extractor that validates the access token and provides its claims.
///
/// The token is read from the `access_token` cookie, falling back to an
/// `Authorization: Bearer` header for non-browser clients. The account must
/// still exist and be active, so deactivation takes effect on the next
/// request.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub)
            .map_err(|_| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }

    pub fn user_type(&self) -> Option<UserType> {
        match self.0.user_type.as_str() {
            "student" => Some(UserType::Student),
            "teacher" => Some(UserType::Teacher),
            "admin" => Some(UserType::Admin),
            _ => None,
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);

        let token = match jar.get(ACCESS_COOKIE_NAME) {
            Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
            _ => bearer_token(parts)
                .map(str::to_string)
                .ok_or_else(|| {
                    AppError::unauthorized("Authentication credentials were not provided.")
                })?,
        };

        let claims = verify_token(&token, &state.jwt_config)?;
        let user = AuthUser(claims);
        let user_id = user.user_id()?;

        let is_active: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&state.db)
                .await
                .context("Failed to check account status")
                .map_err(AppError::database)?;

        if is_active != Some(true) {
            return Err(AppError::unauthorized("User not found or inactive."));
        }

        Ok(user)
    }
}
