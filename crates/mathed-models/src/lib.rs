//! # MathEd Models
//!
//! Domain models and DTOs for the MathEd API.
//!
//! This crate provides the data structures shared by the HTTP layer and the
//! CLI: database entities, request/response DTOs and validation rules.
//!
//! # Modules
//!
//! - [`auth`]: Registration, login, consent and password reset DTOs
//! - [`content`]: Curriculum hierarchy (grades, units, lessons, exercises, glossary)
//! - [`users`]: Accounts, role-specific profiles and age computation
//! - [`value_types`]: Validated primitives such as [`Email`]
//!
//! # Example
//!
//! ```ignore
//! use mathed_models::users::{requires_parental_consent, UserType};
//!
//! if requires_parental_consent(birth_date, today) {
//!     println!("Consent email goes to the parent");
//! }
//! ```

pub mod auth;
pub mod content;
pub mod users;
pub mod value_types;

pub use auth::{
    ConsentApproveRequest, LoginRequest, MessageResponse, PasswordResetConfirmRequest,
    PasswordResetRequest, RegisterStudentRequest, RegisterTeacherRequest, SessionResponse,
    StudentRegistrationResponse,
};

pub use content::{
    Exercise, ExerciseDifficulty, ExerciseType, GlossaryQuery, GlossaryTerm, GradeDetail,
    GradeSummary, LessonDetail, LessonSummary, TestSummary, UnitDetail,
};

pub use users::{
    AccountProfile, CONSENT_AGE, ConsentStatus, ProfileResponse, StudentProfile,
    StudentProfileResponse, TeacherProfile, TeacherProfileResponse, User, UserProfileResponse,
    UserType, age_on, generate_referral_code, requires_parental_consent,
};

pub use value_types::{Email, ValueTypeError};
