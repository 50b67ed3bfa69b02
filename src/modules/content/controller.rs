use axum::{
    Json,
    extract::{Path, State},
};
use mathed_core::{AppError, ErrorResponse};
use mathed_models::{
    GlossaryQuery, GlossaryTerm, GradeDetail, GradeSummary, LessonDetail, UnitDetail,
};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::content::service::ContentService;
use crate::state::AppState;
use crate::validator::ValidatedQuery;

/// List active grades
#[utoipa::path(
    get,
    path = "/api/v1/content/grades/",
    responses(
        (status = 200, description = "Active grades ordered by number", body = Vec<GradeSummary>),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    ),
    tag = "Content"
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_grades(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> Result<Json<Vec<GradeSummary>>, AppError> {
    let grades = ContentService::list_grades(&state.db, state.cache.as_ref()).await?;
    Ok(Json(grades))
}

/// Grade with its published units, lessons and tests
#[utoipa::path(
    get,
    path = "/api/v1/content/grades/{number}/",
    params(
        ("number" = i16, Path, description = "Grade number (5-8)")
    ),
    responses(
        (status = 200, description = "Grade detail", body = GradeDetail),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Grade not found or inactive", body = ErrorResponse)
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    ),
    tag = "Content"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_grade(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(number): Path<i16>,
) -> Result<Json<GradeDetail>, AppError> {
    let grade = ContentService::get_grade(&state.db, state.cache.as_ref(), number).await?;
    Ok(Json(grade))
}

/// Published unit with its lessons and test
#[utoipa::path(
    get,
    path = "/api/v1/content/units/{id}/",
    params(
        ("id" = i64, Path, description = "Unit ID")
    ),
    responses(
        (status = 200, description = "Unit detail", body = UnitDetail),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Unit not found or not published", body = ErrorResponse)
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    ),
    tag = "Content"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_unit(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<UnitDetail>, AppError> {
    let unit = ContentService::get_unit(&state.db, state.cache.as_ref(), id).await?;
    Ok(Json(unit))
}

/// Published lesson with exercises and glossary terms
#[utoipa::path(
    get,
    path = "/api/v1/content/lessons/{id}/",
    params(
        ("id" = i64, Path, description = "Lesson ID")
    ),
    responses(
        (status = 200, description = "Lesson detail", body = LessonDetail),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Lesson not found or not published", body = ErrorResponse)
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    ),
    tag = "Content"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_lesson(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<LessonDetail>, AppError> {
    let lesson = ContentService::get_lesson(&state.db, state.cache.as_ref(), id).await?;
    Ok(Json(lesson))
}

/// Search glossary terms
#[utoipa::path(
    get,
    path = "/api/v1/content/glossary/",
    params(GlossaryQuery),
    responses(
        (status = 200, description = "Matching terms ordered alphabetically", body = Vec<GlossaryTerm>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(
        ("cookie_auth" = []),
        ("bearer_auth" = [])
    ),
    tag = "Content"
)]
#[instrument(skip(state, _auth_user))]
pub async fn search_glossary(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    ValidatedQuery(query): ValidatedQuery<GlossaryQuery>,
) -> Result<Json<Vec<GlossaryTerm>>, AppError> {
    let terms = ContentService::search_glossary(&state.db, state.cache.as_ref(), query).await?;
    Ok(Json(terms))
}
