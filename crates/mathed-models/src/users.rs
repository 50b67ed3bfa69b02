//! Account domain models.
//!
//! Every account is a single [`User`] row tagged with a [`UserType`]. Students
//! and teachers carry a one-to-one profile in their own table; admins have
//! none. [`AccountProfile`] ties the two together.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::value_types::Email;

/// Students younger than this at registration need parental consent.
pub const CONSENT_AGE: i32 = 16;

pub const REFERRAL_CODE_LENGTH: usize = 8;
const REFERRAL_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Student,
    Teacher,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "consent_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConsentStatus {
    Pending,
    Approved,
    Denied,
}

/// A row of the `users` table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: Email,
    /// bcrypt hash
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct StudentProfile {
    pub user_id: Uuid,
    pub grade: i16,
    pub birth_date: NaiveDate,
    pub parent_email: Option<String>,
    pub consent_status: ConsentStatus,
    pub consent_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct TeacherProfile {
    pub user_id: Uuid,
    pub referral_code: String,
    /// Stored as NUMERIC(4,2); selected as `commission_rate::FLOAT8`.
    pub commission_rate: f64,
    pub school_name: String,
}

/// Role-specific data attached to an account.
#[derive(Debug, Clone)]
pub enum AccountProfile {
    Student(StudentProfile),
    Teacher(TeacherProfile),
    Admin,
}

impl AccountProfile {
    pub fn to_response(&self) -> Option<ProfileResponse> {
        match self {
            Self::Student(p) => Some(ProfileResponse::Student(StudentProfileResponse {
                grade: p.grade,
                birth_date: p.birth_date,
                consent_status: p.consent_status,
            })),
            Self::Teacher(p) => Some(ProfileResponse::Teacher(TeacherProfileResponse {
                referral_code: p.referral_code.clone(),
                school_name: p.school_name.clone(),
                commission_rate: p.commission_rate,
            })),
            Self::Admin => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentProfileResponse {
    #[schema(example = 5)]
    pub grade: i16,
    pub birth_date: NaiveDate,
    pub consent_status: ConsentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeacherProfileResponse {
    #[schema(example = "K7QX2M9A")]
    pub referral_code: String,
    pub school_name: String,
    #[schema(example = 0.25)]
    pub commission_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ProfileResponse {
    Student(StudentProfileResponse),
    Teacher(TeacherProfileResponse),
}

/// Public view of an account, as returned by `/auth/me/` and on login.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_type: UserType,
    /// `null` for admins.
    pub profile: Option<ProfileResponse>,
    pub created_at: DateTime<Utc>,
}

impl UserProfileResponse {
    pub fn new(user: &User, profile: &AccountProfile) -> Self {
        Self {
            id: user.id,
            email: user.email.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            user_type: user.user_type,
            profile: profile.to_response(),
            created_at: user.created_at,
        }
    }
}

/// Age in whole years on `today`.
///
/// The year difference, minus one if the birthday has not yet come round
/// this year. Someone born on 29 February turns a year older on 1 March in
/// non-leap years.
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

pub fn requires_parental_consent(birth_date: NaiveDate, today: NaiveDate) -> bool {
    age_on(birth_date, today) < CONSENT_AGE
}

/// Random teacher referral code: uppercase letters and digits.
///
/// Uniqueness is enforced by the database; callers retry on conflict.
pub fn generate_referral_code<R: Rng>(rng: &mut R) -> String {
    (0..REFERRAL_CODE_LENGTH)
        .map(|_| REFERRAL_CODE_CHARSET[rng.gen_range(0..REFERRAL_CODE_CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let birth = date(2012, 6, 15);
        assert_eq!(age_on(birth, date(2026, 6, 14)), 13);
        assert_eq!(age_on(birth, date(2026, 6, 15)), 14);
        assert_eq!(age_on(birth, date(2026, 12, 31)), 14);
    }

    #[test]
    fn test_exactly_sixteen_needs_no_consent() {
        let today = date(2026, 10, 16);
        assert!(!requires_parental_consent(date(2010, 10, 16), today));
        assert!(requires_parental_consent(date(2010, 10, 17), today));
    }

    #[test]
    fn test_leap_day_birthday() {
        let birth = date(2012, 2, 29);
        assert_eq!(age_on(birth, date(2028, 2, 28)), 15);
        assert_eq!(age_on(birth, date(2028, 2, 29)), 16);
        assert_eq!(age_on(birth, date(2027, 3, 1)), 15);
    }

    #[test]
    fn test_future_birth_date_is_negative() {
        assert!(age_on(date(2030, 1, 1), date(2026, 1, 1)) < 0);
    }

    #[test]
    fn test_referral_code_shape() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let code = generate_referral_code(&mut rng);
            assert_eq!(code.len(), REFERRAL_CODE_LENGTH);
            assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_user_type_serialization() {
        assert_eq!(serde_json::to_string(&UserType::Teacher).unwrap(), r#""teacher""#);
        assert_eq!(UserType::Student.as_str(), "student");
    }

    #[test]
    fn test_profile_response_shapes() {
        let student = AccountProfile::Student(StudentProfile {
            user_id: Uuid::new_v4(),
            grade: 6,
            birth_date: date(2013, 3, 1),
            parent_email: Some("mama@example.com".into()),
            consent_status: ConsentStatus::Pending,
            consent_date: None,
        });
        let json = serde_json::to_value(student.to_response()).unwrap();
        assert_eq!(json["grade"], 6);
        assert_eq!(json["consent_status"], "pending");
        assert!(json.get("parent_email").is_none());

        let teacher = AccountProfile::Teacher(TeacherProfile {
            user_id: Uuid::new_v4(),
            referral_code: "ABCD1234".into(),
            commission_rate: 0.25,
            school_name: String::new(),
        });
        let json = serde_json::to_value(teacher.to_response()).unwrap();
        assert_eq!(json["referral_code"], "ABCD1234");
        assert_eq!(json["commission_rate"], 0.25);

        assert!(AccountProfile::Admin.to_response().is_none());
    }
}
