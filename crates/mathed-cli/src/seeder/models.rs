//! Data models for database seeding.

use chrono::NaiveDate;
use mathed_models::UserType;

/// One unit of a seeded grade.
pub struct UnitSeed {
    pub order: i32,
    pub title: &'static str,
    pub description: &'static str,
    /// `(title, summary)`, in lesson order.
    pub lessons: &'static [(&'static str, &'static str)],
    pub test: TestSeed,
}

pub struct TestSeed {
    pub pass_threshold: i32,
    pub time_limit_minutes: i32,
    pub exercise_count: i32,
}

/// What a curriculum seeding run created.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CurriculumSeedReport {
    pub grade_created: bool,
    pub units_created: usize,
    pub lessons_created: usize,
    pub tests_created: usize,
}

/// Seed data for a demo account.
pub struct UserSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub user_type: UserType,
    /// Students only.
    pub grade: Option<i16>,
    pub birth_date: Option<NaiveDate>,
    /// Teachers only.
    pub referral_code: Option<String>,
    pub school_name: Option<String>,
}

/// How many demo accounts to create.
#[derive(Clone, Debug)]
pub struct DemoUsersConfig {
    pub students: usize,
    pub teachers: usize,
    /// Shared plain-text password of every demo account.
    pub password: String,
}

impl Default for DemoUsersConfig {
    fn default() -> Self {
        Self {
            students: 50,
            teachers: 5,
            password: "Demo-Parola-2024".to_string(),
        }
    }
}
