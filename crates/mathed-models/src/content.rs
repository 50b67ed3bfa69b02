//! Curriculum models: Grade → Unit → Lesson → Exercise, plus tests and the glossary.
//!
//! These are read projections. Authoring happens outside the API (the seed
//! CLI or direct database work), so there are no create/update DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use mathed_core::serde::{deserialize_optional_i64, deserialize_optional_trimmed};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "exercise_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExerciseType {
    MultipleChoice,
    FillBlank,
    Expression,
    TrueFalse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "exercise_difficulty", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExerciseDifficulty {
    Easy,
    Medium,
    Hard,
}

/// Item of `GET /content/grades/`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GradeSummary {
    pub id: i64,
    #[schema(example = 5)]
    pub number: i16,
    #[schema(example = "Clasa a V-a")]
    pub name: String,
    /// Published units only.
    pub unit_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GradeDetail {
    pub id: i64,
    pub number: i16,
    pub name: String,
    pub units: Vec<UnitDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnitDetail {
    pub id: i64,
    pub order: i32,
    pub title: String,
    pub description: String,
    pub recommended_unlock_date: Option<NaiveDate>,
    pub lesson_count: i64,
    pub lessons: Vec<LessonSummary>,
    /// `null` when the unit has no published test.
    pub test: Option<TestSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct LessonSummary {
    #[serde(skip)]
    pub unit_id: i64,
    pub id: i64,
    pub order: i32,
    pub title: String,
    pub summary: String,
    pub practice_minimum: i32,
    /// Active exercises only.
    pub exercise_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TestSummary {
    #[serde(skip)]
    pub unit_id: i64,
    pub id: i64,
    #[schema(example = 70)]
    pub pass_threshold: i32,
    pub time_limit_minutes: Option<i32>,
    pub exercise_count: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Exercise {
    pub id: i64,
    pub exercise_type: ExerciseType,
    pub difficulty: ExerciseDifficulty,
    /// Free-form template; its structure depends on `exercise_type`.
    #[schema(value_type = Object)]
    pub template: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct GlossaryTerm {
    pub id: i64,
    #[schema(example = "Fracție")]
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LessonDetail {
    pub id: i64,
    pub order: i32,
    pub title: String,
    pub summary: String,
    /// Markdown body.
    pub content: String,
    pub practice_minimum: i32,
    pub unit_title: String,
    pub grade_number: i16,
    pub exercises: Vec<Exercise>,
    pub glossary_terms: Vec<GlossaryTerm>,
    pub updated_at: DateTime<Utc>,
}

/// Query string of `GET /content/glossary/`.
#[derive(Debug, Clone, Default, Hash, Deserialize, IntoParams, ToSchema)]
pub struct GlossaryQuery {
    /// Restrict to terms attached to this unit.
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    #[param(value_type = Option<i64>)]
    pub unit: Option<i64>,
    /// Case-insensitive substring of the term.
    #[serde(default, deserialize_with = "deserialize_optional_trimmed")]
    pub search: Option<String>,
}

/// Escapes `\`, `%` and `_` so user input matches literally inside `ILIKE`.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
