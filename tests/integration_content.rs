mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::{
    PASSWORD, body_json, create_exercise, create_glossary_term, create_grade, create_lesson,
    create_student, create_unit, create_unit_test, get_with_cookie, login, setup_test_app,
};
use sqlx::PgPool;
use tower::ServiceExt;

async fn student_token(pool: &PgPool, app: &axum::Router) -> String {
    let student = create_student(pool, "approved").await;
    login(app, &student.email, PASSWORD).await.access_token
}

#[sqlx::test(migrations = "./migrations")]
async fn test_content_requires_authentication(pool: PgPool) {
    create_grade(&pool, 5, true).await;
    let app = setup_test_app(pool);

    let request = Request::builder()
        .uri("/api/v1/content/grades/")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "no-store"
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_list_grades_only_active(pool: PgPool) {
    let grade5 = create_grade(&pool, 5, true).await;
    create_grade(&pool, 6, false).await;
    create_unit(&pool, grade5, 1, true).await;
    create_unit(&pool, grade5, 2, true).await;
    create_unit(&pool, grade5, 3, false).await;
    let app = setup_test_app(pool.clone());
    let token = student_token(&pool, &app).await;

    let response = app
        .oneshot(get_with_cookie("/api/v1/content/grades/", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let grades = body.as_array().unwrap();
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0]["number"], 5);
    assert_eq!(grades[0]["unit_count"], 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_grade_tree_hides_unpublished(pool: PgPool) {
    let grade = create_grade(&pool, 6, true).await;
    let published = create_unit(&pool, grade, 1, true).await;
    create_unit(&pool, grade, 2, false).await;
    let lesson = create_lesson(&pool, published, 1, true).await;
    create_lesson(&pool, published, 2, false).await;
    create_exercise(&pool, lesson, true).await;
    create_exercise(&pool, lesson, true).await;
    create_exercise(&pool, lesson, false).await;
    create_unit_test(&pool, published, false).await;
    let app = setup_test_app(pool.clone());
    let token = student_token(&pool, &app).await;

    let response = app
        .oneshot(get_with_cookie("/api/v1/content/grades/6/", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let units = body["units"].as_array().unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0]["id"], published);
    assert_eq!(units[0]["lesson_count"], 1);
    assert_eq!(units[0]["lessons"][0]["exercise_count"], 2);
    assert!(units[0]["lessons"][0].get("unit_id").is_none());
    assert!(units[0]["test"].is_null());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_inactive_or_unknown_grade_not_found(pool: PgPool) {
    create_grade(&pool, 7, false).await;
    let app = setup_test_app(pool.clone());
    let token = student_token(&pool, &app).await;

    for uri in ["/api/v1/content/grades/7/", "/api/v1/content/grades/8/"] {
        let response = app
            .clone()
            .oneshot(get_with_cookie(uri, &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Grade not found.");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn test_unit_with_published_test(pool: PgPool) {
    let grade = create_grade(&pool, 5, true).await;
    let unit = create_unit(&pool, grade, 1, true).await;
    let test = create_unit_test(&pool, unit, true).await;
    let hidden = create_unit(&pool, grade, 2, false).await;
    let app = setup_test_app(pool.clone());
    let token = student_token(&pool, &app).await;

    let response = app
        .clone()
        .oneshot(get_with_cookie(&format!("/api/v1/content/units/{unit}/"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["test"]["id"], test);
    assert_eq!(body["test"]["pass_threshold"], 70);
    assert_eq!(body["test"]["time_limit_minutes"], 30);

    let response = app
        .oneshot(get_with_cookie(
            &format!("/api/v1/content/units/{hidden}/"),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_lesson_detail(pool: PgPool) {
    let grade = create_grade(&pool, 8, true).await;
    let unit = create_unit(&pool, grade, 1, true).await;
    let lesson = create_lesson(&pool, unit, 1, true).await;
    let active = create_exercise(&pool, lesson, true).await;
    create_exercise(&pool, lesson, false).await;
    create_glossary_term(&pool, "Ecuație", Some(unit), Some(lesson)).await;
    create_glossary_term(&pool, "Inecuație", Some(unit), None).await;
    let app = setup_test_app(pool.clone());
    let token = student_token(&pool, &app).await;

    let response = app
        .oneshot(get_with_cookie(
            &format!("/api/v1/content/lessons/{lesson}/"),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["grade_number"], 8);
    assert_eq!(body["unit_title"], "Unitatea 1");
    assert_eq!(body["content"], "# Lecție");
    let exercises = body["exercises"].as_array().unwrap();
    assert_eq!(exercises.len(), 1);
    assert_eq!(exercises[0]["id"], active);
    assert_eq!(exercises[0]["exercise_type"], "multiple_choice");
    assert_eq!(exercises[0]["template"]["question"], "2 + 2 = ?");
    let terms = body["glossary_terms"].as_array().unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0]["term"], "Ecuație");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_lesson_in_unpublished_unit_not_found(pool: PgPool) {
    let grade = create_grade(&pool, 5, true).await;
    let unit = create_unit(&pool, grade, 1, false).await;
    let lesson = create_lesson(&pool, unit, 1, true).await;
    let app = setup_test_app(pool.clone());
    let token = student_token(&pool, &app).await;

    let response = app
        .oneshot(get_with_cookie(
            &format!("/api/v1/content/lessons/{lesson}/"),
            &token,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Lesson not found.");
}

#[sqlx::test(migrations = "./migrations")]
async fn test_glossary_filters(pool: PgPool) {
    let grade = create_grade(&pool, 5, true).await;
    let unit_a = create_unit(&pool, grade, 1, true).await;
    let unit_b = create_unit(&pool, grade, 2, true).await;
    create_glossary_term(&pool, "Fracție", Some(unit_a), None).await;
    create_glossary_term(&pool, "Fracție zecimală", Some(unit_b), None).await;
    create_glossary_term(&pool, "Procent 50%", Some(unit_b), None).await;
    create_glossary_term(&pool, "Produs", None, None).await;
    let app = setup_test_app(pool.clone());
    let token = student_token(&pool, &app).await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/v1/content/glossary/", &token))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 4);
    assert_eq!(body[0]["term"], "Fracție");

    let response = app
        .clone()
        .oneshot(get_with_cookie(
            &format!("/api/v1/content/glossary/?unit={unit_b}"),
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let response = app
        .clone()
        .oneshot(get_with_cookie(
            "/api/v1/content/glossary/?search=FRAC",
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    // `%` is matched literally, not as a wildcard.
    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/v1/content/glossary/?search=%25", &token))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["term"], "Procent 50%");

    let response = app
        .oneshot(get_with_cookie(
            "/api/v1/content/glossary/?unit=&search=",
            &token,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 4);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_glossary_rejects_bad_unit(pool: PgPool) {
    let app = setup_test_app(pool.clone());
    let token = student_token(&pool, &app).await;

    let response = app
        .oneshot(get_with_cookie("/api/v1/content/glossary/?unit=abc", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_etag_and_cache_control(pool: PgPool) {
    create_grade(&pool, 5, true).await;
    let app = setup_test_app(pool.clone());
    let token = student_token(&pool, &app).await;

    let response = app
        .clone()
        .oneshot(get_with_cookie("/api/v1/content/grades/", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).unwrap(),
        "private, max-age=60"
    );
    let etag = response
        .headers()
        .get(header::ETAG)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let request = Request::builder()
        .uri("/api/v1/content/grades/")
        .header(header::COOKIE, format!("access_token={token}"))
        .header(header::IF_NONE_MATCH, &etag)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(response.headers().get(header::ETAG).unwrap(), etag.as_str());

    let request = Request::builder()
        .uri("/api/v1/content/grades/")
        .header(header::COOKIE, format!("access_token={token}"))
        .header(header::IF_NONE_MATCH, "\"stale\"")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
