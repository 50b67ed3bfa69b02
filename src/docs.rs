use utoipa::openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use mathed_config::cookie::ACCESS_COOKIE_NAME;
use mathed_core::ErrorResponse;
use mathed_models::{
    ConsentApproveRequest, ConsentStatus, Exercise, ExerciseDifficulty, ExerciseType,
    GlossaryTerm, GradeDetail, GradeSummary, LessonDetail, LessonSummary, LoginRequest,
    MessageResponse, PasswordResetConfirmRequest, PasswordResetRequest, ProfileResponse,
    RegisterStudentRequest, RegisterTeacherRequest, SessionResponse, StudentProfileResponse,
    StudentRegistrationResponse, TeacherProfileResponse, TestSummary, UnitDetail,
    UserProfileResponse, UserType,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_student,
        crate::modules::auth::controller::register_teacher,
        crate::modules::auth::controller::approve_consent,
        crate::modules::auth::controller::login,
        crate::modules::auth::controller::logout,
        crate::modules::auth::controller::refresh_token,
        crate::modules::auth::controller::request_password_reset,
        crate::modules::auth::controller::confirm_password_reset,
        crate::modules::users::controller::get_me,
        crate::modules::content::controller::list_grades,
        crate::modules::content::controller::get_grade,
        crate::modules::content::controller::get_unit,
        crate::modules::content::controller::get_lesson,
        crate::modules::content::controller::search_glossary,
    ),
    components(
        schemas(
            RegisterStudentRequest,
            RegisterTeacherRequest,
            StudentRegistrationResponse,
            ConsentApproveRequest,
            LoginRequest,
            SessionResponse,
            PasswordResetRequest,
            PasswordResetConfirmRequest,
            MessageResponse,
            UserProfileResponse,
            ProfileResponse,
            StudentProfileResponse,
            TeacherProfileResponse,
            UserType,
            ConsentStatus,
            GradeSummary,
            GradeDetail,
            UnitDetail,
            LessonSummary,
            TestSummary,
            LessonDetail,
            Exercise,
            ExerciseType,
            ExerciseDifficulty,
            GlossaryTerm,
            ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, parental consent, sessions and password reset"),
        (name = "Content", description = "Read-only Grade 5-8 curriculum")
    ),
    info(
        title = "MathEd Romania API",
        version = "0.1.0",
        description = "Backend for the MathEd Romania mathematics learning platform.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(ACCESS_COOKIE_NAME))),
            );
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
