use crate::state::AppState;
use axum::{Router, routing::post};

use super::controller::{
    approve_consent, confirm_password_reset, login, logout, refresh_token, register_student,
    register_teacher, request_password_reset,
};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register/student/", post(register_student))
        .route("/register/teacher/", post(register_teacher))
        .route("/consent/approve/", post(approve_consent))
        .route("/login/", post(login))
        .route("/logout/", post(logout))
        .route("/token/refresh/", post(refresh_token))
        .route("/password-reset/", post(request_password_reset))
        .route("/password-reset/confirm/", post(confirm_password_reset))
}
