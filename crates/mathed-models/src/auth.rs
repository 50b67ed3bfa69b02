//! Authentication DTOs.
//!
//! Structural checks (lengths, formats, ranges) live on the request types as
//! `validator` rules. Checks that need the database or the clock, such as
//! email uniqueness and the consent age, run in the auth service.

use chrono::NaiveDate;
use mathed_core::serde::deserialize_optional_trimmed;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::users::UserProfileResponse;

/// Credentials for `POST /auth/login/`.
///
/// Both fields default to empty so that a missing value produces the
/// login-specific message rather than a deserialisation error.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    #[schema(example = "elev@example.com")]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterStudentRequest {
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "elev@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
    pub password_confirm: String,
    #[validate(length(
        min = 1,
        max = 150,
        message = "Ensure this field has between 1 and 150 characters."
    ))]
    pub first_name: String,
    #[validate(length(
        min = 1,
        max = 150,
        message = "Ensure this field has between 1 and 150 characters."
    ))]
    pub last_name: String,
    #[validate(range(min = 5, max = 8, message = "Grade must be between 5 and 8."))]
    #[schema(example = 5)]
    pub grade: i16,
    #[schema(example = "2013-04-21")]
    pub birth_date: NaiveDate,
    /// Required when the student is under 16.
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(email(message = "Enter a valid email address."))]
    pub parent_email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterTeacherRequest {
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "profesor@scoala.ro")]
    pub email: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
    pub password_confirm: String,
    #[validate(length(
        min = 1,
        max = 150,
        message = "Ensure this field has between 1 and 150 characters."
    ))]
    pub first_name: String,
    #[validate(length(
        min = 1,
        max = 150,
        message = "Ensure this field has between 1 and 150 characters."
    ))]
    pub last_name: String,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(length(max = 200, message = "Ensure this field has no more than 200 characters."))]
    pub school_name: Option<String>,
}

/// Body of `POST /auth/consent/approve/`, as taken from the emailed link.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ConsentApproveRequest {
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(required(message = "This field is required."))]
    pub uid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(required(message = "This field is required."))]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordResetRequest {
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(example = "elev@example.com")]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PasswordResetConfirmRequest {
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(required(message = "This field is required."))]
    pub uid: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    #[validate(required(message = "This field is required."))]
    pub token: Option<String>,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub new_password: String,
    pub new_password_confirm: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Login and teacher registration reply; cookies carry the tokens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub message: String,
    pub user: UserProfileResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentRegistrationResponse {
    pub message: String,
    pub requires_consent: bool,
    /// Present only when the account was activated immediately.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfileResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student_json() -> serde_json::Value {
        serde_json::json!({
            "email": "elev@example.com",
            "password": "Fractii-Zecimale-42",
            "password_confirm": "Fractii-Zecimale-42",
            "first_name": "Ana",
            "last_name": "Pop",
            "grade": 5,
            "birth_date": "2014-05-01",
        })
    }

    #[test]
    fn test_valid_student_request() {
        let req: RegisterStudentRequest = serde_json::from_value(student_json()).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.parent_email.is_none());
    }

    #[test]
    fn test_blank_parent_email_is_absent() {
        let mut json = student_json();
        json["parent_email"] = serde_json::json!("  ");
        let req: RegisterStudentRequest = serde_json::from_value(json).unwrap();
        assert!(req.parent_email.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_invalid_parent_email_rejected() {
        let mut json = student_json();
        json["parent_email"] = serde_json::json!("not-an-email");
        let req: RegisterStudentRequest = serde_json::from_value(json).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("parent_email"));
    }

    #[test]
    fn test_grade_out_of_range() {
        let mut json = student_json();
        json["grade"] = serde_json::json!(9);
        let req: RegisterStudentRequest = serde_json::from_value(json).unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("grade"));
    }

    #[test]
    fn test_name_too_long() {
        let mut json = student_json();
        json["first_name"] = serde_json::json!("a".repeat(151));
        let req: RegisterStudentRequest = serde_json::from_value(json).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_teacher_school_name_limit() {
        let req: RegisterTeacherRequest = serde_json::from_value(serde_json::json!({
            "email": "prof@scoala.ro",
            "password": "x",
            "password_confirm": "x",
            "first_name": "Ion",
            "last_name": "Ionescu",
            "school_name": "s".repeat(201),
        }))
        .unwrap();
        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("school_name"));
    }

    #[test]
    fn test_consent_request_requires_both_fields() {
        let req: ConsentApproveRequest =
            serde_json::from_value(serde_json::json!({"uid": "abc", "token": ""})).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("token"));
        assert!(!fields.contains_key("uid"));
    }

    #[test]
    fn test_registration_response_omits_missing_user() {
        let resp = StudentRegistrationResponse {
            message: "ok".into(),
            requires_consent: true,
            user: None,
        };
        let json = serde_json::to_value(resp).unwrap();
        assert!(json.get("user").is_none());
        assert_eq!(json["requires_consent"], true);
    }
}
