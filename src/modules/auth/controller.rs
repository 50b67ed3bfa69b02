use crate::middleware::auth::AuthUser;
use crate::state::AppState;
use crate::utils::email::EmailService;
use crate::validator::{JsonPayload, ValidatedJson};
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::CookieJar;
use mathed_config::cookie::REFRESH_COOKIE_NAME;
use mathed_core::{AppError, ErrorResponse};
use mathed_models::{
    ConsentApproveRequest, LoginRequest, MessageResponse, PasswordResetConfirmRequest,
    PasswordResetRequest, RegisterStudentRequest, RegisterTeacherRequest, SessionResponse,
    StudentRegistrationResponse,
};
use tracing::instrument;

use super::cookies::{clear_session_cookies, set_session_cookies};
use super::model::{
    ACCOUNT_CREATED_MESSAGE, LOGIN_MESSAGE, LOGOUT_MESSAGE, REFRESHED_MESSAGE,
    RESET_DONE_MESSAGE, RESET_REQUESTED_MESSAGE, STUDENT_PENDING_MESSAGE, StudentRegistration,
};
use super::service::AuthService;

fn refresh_cookie(jar: &CookieJar) -> Option<String> {
    jar.get(REFRESH_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Register a student account
///
/// Students under 16 are created inactive and their parent receives a
/// consent email; older students are signed in immediately.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register/student/",
    request_body = RegisterStudentRequest,
    responses(
        (status = 201, description = "Student registered", body = StudentRegistrationResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn register_student(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<RegisterStudentRequest>,
) -> Result<(StatusCode, CookieJar, Json<StudentRegistrationResponse>), AppError> {
    let mailer = EmailService::new(state.email_config.clone());

    match AuthService::register_student(&state.db, dto, &state.jwt_config, &mailer).await? {
        StudentRegistration::PendingConsent => Ok((
            StatusCode::CREATED,
            jar,
            Json(StudentRegistrationResponse {
                message: STUDENT_PENDING_MESSAGE.to_string(),
                requires_consent: true,
                user: None,
            }),
        )),
        StudentRegistration::Active(session) => {
            let user = session.profile_response();
            let jar = set_session_cookies(
                jar,
                session.tokens,
                &state.jwt_config,
                &state.cookie_config,
            );
            Ok((
                StatusCode::CREATED,
                jar,
                Json(StudentRegistrationResponse {
                    message: ACCOUNT_CREATED_MESSAGE.to_string(),
                    requires_consent: false,
                    user: Some(user),
                }),
            ))
        }
    }
}

/// Register a teacher account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register/teacher/",
    request_body = RegisterTeacherRequest,
    responses(
        (status = 201, description = "Teacher registered and signed in", body = SessionResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 429, description = "Too many requests"),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn register_teacher(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(dto): ValidatedJson<RegisterTeacherRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>), AppError> {
    let session = AuthService::register_teacher(&state.db, dto, &state.jwt_config).await?;
    let user = session.profile_response();
    let jar = set_session_cookies(jar, session.tokens, &state.jwt_config, &state.cookie_config);

    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse {
            message: ACCOUNT_CREATED_MESSAGE.to_string(),
            user,
        }),
    ))
}

/// Approve a student account from the parental consent link
#[utoipa::path(
    post,
    path = "/api/v1/auth/consent/approve/",
    request_body = ConsentApproveRequest,
    responses(
        (status = 200, description = "Account activated, or already active", body = MessageResponse),
        (status = 400, description = "Missing fields or invalid/expired link", body = ErrorResponse),
        (status = 429, description = "Too many requests")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn approve_consent(
    State(state): State<AppState>,
    JsonPayload(dto): JsonPayload<ConsentApproveRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let outcome = AuthService::approve_consent(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(MessageResponse::new(outcome.message())))
}

/// Sign in with email and password
///
/// Sets the `access_token` and `refresh_token` cookies.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = SessionResponse),
        (status = 400, description = "Email or password missing", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Account inactive or awaiting parental consent", body = ErrorResponse),
        (status = 429, description = "Too many requests")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, dto))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonPayload(dto): JsonPayload<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AppError> {
    let session = AuthService::login(&state.db, dto, &state.jwt_config).await?;
    let user = session.profile_response();
    let jar = set_session_cookies(jar, session.tokens, &state.jwt_config, &state.cookie_config);

    Ok((
        jar,
        Json(SessionResponse {
            message: LOGIN_MESSAGE.to_string(),
            user,
        }),
    ))
}

/// Sign out and clear the session cookies
#[utoipa::path(
    post,
    path = "/api/v1/auth/logout/",
    responses(
        (status = 200, description = "Logged out", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar, auth_user), fields(user.id = %auth_user.0.sub))]
pub async fn logout(
    State(state): State<AppState>,
    auth_user: AuthUser,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), AppError> {
    let user_id = auth_user.user_id()?;
    AuthService::logout(
        &state.db,
        user_id,
        refresh_cookie(&jar).as_deref(),
        &state.jwt_config,
    )
    .await?;

    let jar = clear_session_cookies(jar, &state.cookie_config);
    Ok((jar, Json(MessageResponse::new(LOGOUT_MESSAGE))))
}

/// Rotate the session using the refresh cookie
///
/// The presented refresh token is revoked and a new pair is set. On failure
/// both cookies are cleared.
#[utoipa::path(
    post,
    path = "/api/v1/auth/token/refresh/",
    responses(
        (status = 200, description = "New token pair set in cookies", body = MessageResponse),
        (status = 401, description = "Missing, invalid, expired or reused refresh token", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, jar))]
pub async fn refresh_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>), (CookieJar, AppError)> {
    let presented = refresh_cookie(&jar);

    match AuthService::refresh(&state.db, presented.as_deref(), &state.jwt_config).await {
        Ok(tokens) => {
            let jar = set_session_cookies(jar, tokens, &state.jwt_config, &state.cookie_config);
            Ok((jar, Json(MessageResponse::new(REFRESHED_MESSAGE))))
        }
        Err(e) => Err((clear_session_cookies(jar, &state.cookie_config), e)),
    }
}

/// Request a password reset email
///
/// Always succeeds so that registered addresses cannot be discovered.
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Reset email sent if the account exists", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 429, description = "Too many requests")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<PasswordResetRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let mailer = EmailService::new(state.email_config.clone());
    AuthService::request_password_reset(&state.db, dto, &state.jwt_config, &mailer).await?;
    Ok(Json(MessageResponse::new(RESET_REQUESTED_MESSAGE)))
}

/// Set a new password from the reset link
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/confirm/",
    request_body = PasswordResetConfirmRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid link or password rejected", body = ErrorResponse),
        (status = 429, description = "Too many requests")
    ),
    tag = "Authentication"
)]
#[instrument(skip(state, dto))]
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<PasswordResetConfirmRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    AuthService::confirm_password_reset(&state.db, dto, &state.jwt_config).await?;
    Ok(Json(MessageResponse::new(RESET_DONE_MESSAGE)))
}
