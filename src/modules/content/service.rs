use std::collections::HashMap;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use mathed_cache::{RedisCache, hash_filters, keys};
use mathed_core::AppError;
use mathed_models::{
    Exercise, GlossaryQuery, GlossaryTerm, GradeDetail, GradeSummary, LessonDetail,
    LessonSummary, TestSummary, UnitDetail, content::escape_like,
};
use sqlx::{FromRow, PgConnection, PgPool};
use tracing::{debug, instrument, warn};

use crate::metrics::track_cache_lookup;

#[derive(Debug, FromRow)]
struct GradeRow {
    id: i64,
    number: i16,
    name: String,
}

#[derive(Debug, FromRow)]
struct UnitRow {
    id: i64,
    order: i32,
    title: String,
    description: String,
    recommended_unlock_date: Option<NaiveDate>,
}

#[derive(Debug, FromRow)]
struct LessonRow {
    id: i64,
    order: i32,
    title: String,
    summary: String,
    content: String,
    practice_minimum: i32,
    unit_title: String,
    grade_number: i16,
    updated_at: DateTime<Utc>,
}

/// Attaches published lessons and the published test to each unit, keeping
/// the order of `units`. Lessons are expected in display order.
fn assemble_units(
    units: Vec<UnitRow>,
    lessons: Vec<LessonSummary>,
    tests: Vec<TestSummary>,
) -> Vec<UnitDetail> {
    let mut lessons_by_unit: HashMap<i64, Vec<LessonSummary>> = HashMap::new();
    for lesson in lessons {
        lessons_by_unit.entry(lesson.unit_id).or_default().push(lesson);
    }

    let mut tests_by_unit: HashMap<i64, TestSummary> =
        tests.into_iter().map(|test| (test.unit_id, test)).collect();

    units
        .into_iter()
        .map(|unit| {
            let lessons = lessons_by_unit.remove(&unit.id).unwrap_or_default();
            UnitDetail {
                id: unit.id,
                order: unit.order,
                title: unit.title,
                description: unit.description,
                recommended_unlock_date: unit.recommended_unlock_date,
                lesson_count: lessons.len() as i64,
                lessons,
                test: tests_by_unit.remove(&unit.id),
            }
        })
        .collect()
}

pub struct ContentService;

impl ContentService {
    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "grades"))]
    pub async fn list_grades(
        db: &PgPool,
        cache: Option<&RedisCache>,
    ) -> Result<Vec<GradeSummary>, AppError> {
        let cache_key = keys::content::grades();

        if let Some(cache) = cache {
            let cached = cache.get::<Vec<GradeSummary>>(&cache_key).await;
            track_cache_lookup("grades", cached.is_some());
            if let Some(grades) = cached {
                debug!("Grades found in cache");
                return Ok(grades);
            }
        }

        let grades = sqlx::query_as::<_, GradeSummary>(
            "SELECT g.id, g.number, g.name,
                    (SELECT COUNT(*) FROM units u WHERE u.grade_id = g.id AND u.is_published) AS unit_count
             FROM grades g
             WHERE g.is_active
             ORDER BY g.number",
        )
        .fetch_all(db)
        .await
        .context("Failed to fetch grades")
        .map_err(AppError::database)?;

        if let Some(cache) = cache
            && let Err(e) = cache.set(&cache_key, &grades).await
        {
            warn!(error = %e, "Failed to cache grades");
        }

        Ok(grades)
    }

    /// Grade by its number (5 to 8) with the full published tree below it.
    #[instrument(skip(db, cache), fields(grade.number = %number))]
    pub async fn get_grade(
        db: &PgPool,
        cache: Option<&RedisCache>,
        number: i16,
    ) -> Result<GradeDetail, AppError> {
        let cache_key = keys::content::grade(number);

        if let Some(cache) = cache {
            let cached = cache.get::<GradeDetail>(&cache_key).await;
            track_cache_lookup("grade", cached.is_some());
            if let Some(grade) = cached {
                debug!("Grade found in cache");
                return Ok(grade);
            }
        }

        let mut conn = db
            .acquire()
            .await
            .context("Failed to acquire connection")
            .map_err(AppError::database)?;

        let grade = sqlx::query_as::<_, GradeRow>(
            "SELECT id, number, name FROM grades WHERE number = $1 AND is_active",
        )
        .bind(number)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to fetch grade")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Grade not found.")))?;

        let units = sqlx::query_as::<_, UnitRow>(
            r#"SELECT id, "order", title, description, recommended_unlock_date
               FROM units
               WHERE grade_id = $1 AND is_published
               ORDER BY "order""#,
        )
        .bind(grade.id)
        .fetch_all(&mut *conn)
        .await
        .context("Failed to fetch units")
        .map_err(AppError::database)?;

        let units = Self::with_lessons_and_tests(&mut *conn, units).await?;

        let detail = GradeDetail {
            id: grade.id,
            number: grade.number,
            name: grade.name,
            units,
        };

        if let Some(cache) = cache
            && let Err(e) = cache.set(&cache_key, &detail).await
        {
            warn!(error = %e, "Failed to cache grade");
        }

        Ok(detail)
    }

    #[instrument(skip(db, cache), fields(unit.id = %unit_id))]
    pub async fn get_unit(
        db: &PgPool,
        cache: Option<&RedisCache>,
        unit_id: i64,
    ) -> Result<UnitDetail, AppError> {
        let cache_key = keys::content::unit(unit_id);

        if let Some(cache) = cache {
            let cached = cache.get::<UnitDetail>(&cache_key).await;
            track_cache_lookup("unit", cached.is_some());
            if let Some(unit) = cached {
                debug!("Unit found in cache");
                return Ok(unit);
            }
        }

        let mut conn = db
            .acquire()
            .await
            .context("Failed to acquire connection")
            .map_err(AppError::database)?;

        let unit = sqlx::query_as::<_, UnitRow>(
            r#"SELECT u.id, u."order", u.title, u.description, u.recommended_unlock_date
               FROM units u
               JOIN grades g ON g.id = u.grade_id
               WHERE u.id = $1 AND u.is_published AND g.is_active"#,
        )
        .bind(unit_id)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to fetch unit")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Unit not found.")))?;

        let unit = Self::with_lessons_and_tests(&mut *conn, vec![unit])
            .await?
            .pop()
            .ok_or_else(|| AppError::internal_error("Unit vanished while assembling"))?;

        if let Some(cache) = cache
            && let Err(e) = cache.set(&cache_key, &unit).await
        {
            warn!(error = %e, "Failed to cache unit");
        }

        Ok(unit)
    }

    async fn with_lessons_and_tests(
        conn: &mut PgConnection,
        units: Vec<UnitRow>,
    ) -> Result<Vec<UnitDetail>, AppError> {
        if units.is_empty() {
            return Ok(Vec::new());
        }

        let unit_ids: Vec<i64> = units.iter().map(|unit| unit.id).collect();

        let lessons = sqlx::query_as::<_, LessonSummary>(
            r#"SELECT l.unit_id, l.id, l."order", l.title, l.summary, l.practice_minimum,
                      (SELECT COUNT(*) FROM exercises e WHERE e.lesson_id = l.id AND e.is_active) AS exercise_count
               FROM lessons l
               WHERE l.unit_id = ANY($1) AND l.is_published
               ORDER BY l.unit_id, l."order""#,
        )
        .bind(&unit_ids)
        .fetch_all(&mut *conn)
        .await
        .context("Failed to fetch lessons")
        .map_err(AppError::database)?;

        let tests = sqlx::query_as::<_, TestSummary>(
            "SELECT unit_id, id, pass_threshold, time_limit_minutes, exercise_count
             FROM tests
             WHERE unit_id = ANY($1) AND is_published",
        )
        .bind(&unit_ids)
        .fetch_all(&mut *conn)
        .await
        .context("Failed to fetch tests")
        .map_err(AppError::database)?;

        Ok(assemble_units(units, lessons, tests))
    }

    #[instrument(skip(db, cache), fields(lesson.id = %lesson_id))]
    pub async fn get_lesson(
        db: &PgPool,
        cache: Option<&RedisCache>,
        lesson_id: i64,
    ) -> Result<LessonDetail, AppError> {
        let cache_key = keys::content::lesson(lesson_id);

        if let Some(cache) = cache {
            let cached = cache.get::<LessonDetail>(&cache_key).await;
            track_cache_lookup("lesson", cached.is_some());
            if let Some(lesson) = cached {
                debug!("Lesson found in cache");
                return Ok(lesson);
            }
        }

        let mut conn = db
            .acquire()
            .await
            .context("Failed to acquire connection")
            .map_err(AppError::database)?;

        let lesson = sqlx::query_as::<_, LessonRow>(
            r#"SELECT l.id, l."order", l.title, l.summary, l.content, l.practice_minimum,
                      u.title AS unit_title, g.number AS grade_number, l.updated_at
               FROM lessons l
               JOIN units u ON u.id = l.unit_id
               JOIN grades g ON g.id = u.grade_id
               WHERE l.id = $1 AND l.is_published AND u.is_published AND g.is_active"#,
        )
        .bind(lesson_id)
        .fetch_optional(&mut *conn)
        .await
        .context("Failed to fetch lesson")
        .map_err(AppError::database)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Lesson not found.")))?;

        let exercises = sqlx::query_as::<_, Exercise>(
            "SELECT id, exercise_type, difficulty, template
             FROM exercises
             WHERE lesson_id = $1 AND is_active
             ORDER BY id",
        )
        .bind(lesson_id)
        .fetch_all(&mut *conn)
        .await
        .context("Failed to fetch exercises")
        .map_err(AppError::database)?;

        let glossary_terms = sqlx::query_as::<_, GlossaryTerm>(
            "SELECT id, term, definition FROM glossary_terms WHERE lesson_id = $1 ORDER BY term",
        )
        .bind(lesson_id)
        .fetch_all(&mut *conn)
        .await
        .context("Failed to fetch glossary terms")
        .map_err(AppError::database)?;

        let detail = LessonDetail {
            id: lesson.id,
            order: lesson.order,
            title: lesson.title,
            summary: lesson.summary,
            content: lesson.content,
            practice_minimum: lesson.practice_minimum,
            unit_title: lesson.unit_title,
            grade_number: lesson.grade_number,
            exercises,
            glossary_terms,
            updated_at: lesson.updated_at,
        };

        if let Some(cache) = cache
            && let Err(e) = cache.set(&cache_key, &detail).await
        {
            warn!(error = %e, "Failed to cache lesson");
        }

        Ok(detail)
    }

    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "glossary_terms"))]
    pub async fn search_glossary(
        db: &PgPool,
        cache: Option<&RedisCache>,
        query: GlossaryQuery,
    ) -> Result<Vec<GlossaryTerm>, AppError> {
        let cache_key = keys::content::glossary(&hash_filters(&query));

        if let Some(cache) = cache {
            let cached = cache.get::<Vec<GlossaryTerm>>(&cache_key).await;
            track_cache_lookup("glossary", cached.is_some());
            if let Some(terms) = cached {
                debug!("Glossary results found in cache");
                return Ok(terms);
            }
        }

        let pattern = query.search.as_deref().map(escape_like);

        let terms = sqlx::query_as::<_, GlossaryTerm>(
            r"SELECT id, term, definition
              FROM glossary_terms
              WHERE ($1::BIGINT IS NULL OR unit_id = $1)
                AND ($2::TEXT IS NULL OR term ILIKE '%' || $2 || '%' ESCAPE '\')
              ORDER BY term",
        )
        .bind(query.unit)
        .bind(pattern)
        .fetch_all(db)
        .await
        .context("Failed to search glossary")
        .map_err(AppError::database)?;

        if let Some(cache) = cache
            && let Err(e) = cache.set(&cache_key, &terms).await
        {
            warn!(error = %e, "Failed to cache glossary results");
        }

        Ok(terms)
    }
}
