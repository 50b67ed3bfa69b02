use crate::middleware::auth::AuthUser;
use crate::modules::users::service::UserService;
use crate::state::AppState;
use axum::{Json, extract::State};
use mathed_core::{AppError, ErrorResponse};
use mathed_models::UserProfileResponse;
use tracing::instrument;

/// Current user's account and role profile
#[utoipa::path(
    get,
    path = "/api/v1/auth/me/",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = UserProfileResponse),
        (status = 401, description = "Missing, invalid or expired access token", body = ErrorResponse),
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, auth_user), fields(user.id = %auth_user.0.sub))]
pub async fn get_me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserProfileResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    let (user, profile) = UserService::get_account(&state.db, user_id).await?;
    Ok(Json(UserProfileResponse::new(&user, &profile)))
}
