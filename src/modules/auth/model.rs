//! Service-level results of the auth workflows.
//!
//! Request and response bodies live in `mathed_models::auth`; these types
//! carry what the controllers need to build the reply and set cookies.

use mathed_models::{AccountProfile, User, UserProfileResponse};

pub use super::cookies::SessionTokens;

pub const STUDENT_PENDING_MESSAGE: &str = "Account created. A consent email has been sent to your parent. Your account will be activated once they approve.";
pub const ACCOUNT_CREATED_MESSAGE: &str = "Account created successfully.";
pub const LOGIN_MESSAGE: &str = "Login successful.";
pub const LOGOUT_MESSAGE: &str = "Logged out successfully.";
pub const REFRESHED_MESSAGE: &str = "Token refreshed.";
pub const ALREADY_ACTIVE_MESSAGE: &str = "Account is already active.";
pub const CONSENT_APPROVED_MESSAGE: &str = "Consent approved. The student can now log in.";
pub const RESET_REQUESTED_MESSAGE: &str =
    "If an account with that email exists, a reset link has been sent.";
pub const RESET_DONE_MESSAGE: &str = "Password reset successful. You can now log in.";

/// An account signed in by login or by registration with immediate activation.
#[derive(Debug)]
pub struct Session {
    pub user: User,
    pub profile: AccountProfile,
    pub tokens: SessionTokens,
}

impl Session {
    pub fn profile_response(&self) -> UserProfileResponse {
        UserProfileResponse::new(&self.user, &self.profile)
    }
}

#[derive(Debug)]
pub enum StudentRegistration {
    /// Under the consent age: inactive until the parent approves.
    PendingConsent,
    Active(Session),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentOutcome {
    Approved,
    AlreadyActive,
}

impl ConsentOutcome {
    pub fn message(self) -> &'static str {
        match self {
            Self::Approved => CONSENT_APPROVED_MESSAGE,
            Self::AlreadyActive => ALREADY_ACTIVE_MESSAGE,
        }
    }
}
