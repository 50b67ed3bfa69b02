#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, header};
use axum::response::Response;
use chrono::{DateTime, Months, NaiveDate, Utc};
use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};
use http_body_util::BodyExt;
use mathed::mathed_auth::{AccountState, ActionPurpose, create_action_token, encode_uid};
use mathed::router::init_router;
use mathed::state::AppState;
use mathed_core::hash_password;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

pub const PASSWORD: &str = "Ecuatii-Liniare-2024";

pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

/// State as the server builds it, minus Redis, rate limiting and SMTP.
pub fn test_state(pool: PgPool) -> AppState {
    dotenvy::dotenv().ok();
    let mut state = AppState::for_pool(pool);
    state.email_config.enabled = false;
    state.cookie_config.secure = false;
    state
}

pub fn setup_test_app(pool: PgPool) -> axum::Router {
    init_router(test_state(pool))
}

pub fn generate_unique_email() -> String {
    format!("user-{}@example.com", Uuid::new_v4().simple())
}

/// Birth date making someone `years` old today, shifted by `days`.
pub fn birth_date_for_age(years: u32, days: i64) -> NaiveDate {
    let today = Utc::now().date_naive();
    today
        .checked_sub_months(Months::new(years * 12))
        .unwrap()
        .checked_add_signed(chrono::Duration::days(days))
        .unwrap()
}

async fn insert_user(pool: &PgPool, user_type: &str, is_active: bool) -> TestUser {
    let email = generate_unique_email();
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    let hashed = hash_password(PASSWORD).unwrap();

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (email, password, first_name, last_name, user_type, is_active)
         VALUES ($1, $2, $3, $4, $5::user_type, $6)
         RETURNING id",
    )
    .bind(&email)
    .bind(&hashed)
    .bind(&first_name)
    .bind(&last_name)
    .bind(user_type)
    .bind(is_active)
    .fetch_one(pool)
    .await
    .unwrap();

    TestUser {
        id,
        email,
        password: PASSWORD.to_string(),
    }
}

/// Student with a profile in the given consent state. Active unless pending.
pub async fn create_student(pool: &PgPool, consent_status: &str) -> TestUser {
    let user = insert_user(pool, "student", consent_status == "approved").await;

    sqlx::query(
        "INSERT INTO student_profiles (user_id, grade, birth_date, parent_email, consent_status, consent_date)
         VALUES ($1, 5, $2, $3, $4::consent_status,
                 CASE WHEN $4 = 'approved' THEN NOW() END)",
    )
    .bind(user.id)
    .bind(birth_date_for_age(11, -30))
    .bind("parinte@example.com")
    .bind(consent_status)
    .execute(pool)
    .await
    .unwrap();

    user
}

pub async fn create_teacher(pool: &PgPool) -> TestUser {
    let user = insert_user(pool, "teacher", true).await;
    let code: String = Uuid::new_v4().simple().to_string()[..8].to_uppercase();

    sqlx::query(
        "INSERT INTO teacher_profiles (user_id, referral_code, school_name) VALUES ($1, $2, $3)",
    )
    .bind(user.id)
    .bind(code)
    .bind("Școala Gimnazială nr. 1")
    .execute(pool)
    .await
    .unwrap();

    user
}

pub async fn create_admin(pool: &PgPool) -> TestUser {
    insert_user(pool, "admin", true).await
}

pub async fn deactivate(pool: &PgPool, user_id: Uuid) {
    sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
}

// Curriculum fixtures

pub async fn create_grade(pool: &PgPool, number: i16, active: bool) -> i64 {
    sqlx::query_scalar("INSERT INTO grades (number, name, is_active) VALUES ($1, $2, $3) RETURNING id")
        .bind(number)
        .bind(format!("Clasa {number}"))
        .bind(active)
        .fetch_one(pool)
        .await
        .unwrap()
}

pub async fn create_unit(pool: &PgPool, grade_id: i64, order: i32, published: bool) -> i64 {
    sqlx::query_scalar(
        r#"INSERT INTO units (grade_id, "order", title, description, is_published)
           VALUES ($1, $2, $3, 'Descriere', $4) RETURNING id"#,
    )
    .bind(grade_id)
    .bind(order)
    .bind(format!("Unitatea {order}"))
    .bind(published)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_lesson(pool: &PgPool, unit_id: i64, order: i32, published: bool) -> i64 {
    sqlx::query_scalar(
        r#"INSERT INTO lessons (unit_id, "order", title, summary, content, is_published)
           VALUES ($1, $2, $3, 'Rezumat', '# Lecție', $4) RETURNING id"#,
    )
    .bind(unit_id)
    .bind(order)
    .bind(format!("Lecția {order}"))
    .bind(published)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_exercise(pool: &PgPool, lesson_id: i64, active: bool) -> i64 {
    sqlx::query_scalar(
        r#"INSERT INTO exercises (lesson_id, exercise_type, difficulty, template, is_active)
           VALUES ($1, 'multiple_choice', 'easy', '{"question": "2 + 2 = ?"}'::jsonb, $2)
           RETURNING id"#,
    )
    .bind(lesson_id)
    .bind(active)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_unit_test(pool: &PgPool, unit_id: i64, published: bool) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO tests (unit_id, time_limit_minutes, is_published) VALUES ($1, 30, $2) RETURNING id",
    )
    .bind(unit_id)
    .bind(published)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_glossary_term(
    pool: &PgPool,
    term: &str,
    unit_id: Option<i64>,
    lesson_id: Option<i64>,
) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO glossary_terms (term, definition, unit_id, lesson_id)
         VALUES ($1, 'Definiție', $2, $3) RETURNING id",
    )
    .bind(term)
    .bind(unit_id)
    .bind(lesson_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

// HTTP helpers

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn json_request_with_cookies(method: &str, uri: &str, body: Value, cookies: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, cookies)
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_with_cookie(uri: &str, access_token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, format!("access_token={access_token}"))
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Every `Set-Cookie` header of the response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(String::from))
        .collect()
}

/// Value of the named cookie as set by the response, if any.
pub fn cookie_value(response: &Response, name: &str) -> Option<String> {
    set_cookies(response).into_iter().find_map(|cookie| {
        let (pair, _) = cookie.split_once(';').unwrap_or((&cookie, ""));
        let (key, value) = pair.split_once('=')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}

pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

pub async fn login(app: &axum::Router, email: &str, password: &str) -> Session {
    use tower::ServiceExt;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/auth/login/",
            serde_json::json!({"email": email, "password": password}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), axum::http::StatusCode::OK);

    Session {
        access_token: cookie_value(&response, "access_token").unwrap(),
        refresh_token: cookie_value(&response, "refresh_token").unwrap(),
    }
}

/// `(uid, token)` of an emailed link for the user's current account state.
pub async fn action_link(pool: &PgPool, user_id: Uuid, purpose: ActionPurpose) -> (String, String) {
    let (email, password_hash, last_login_at): (String, String, Option<DateTime<Utc>>) =
        sqlx::query_as("SELECT email, password, last_login_at FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await
            .unwrap();

    let state = AccountState {
        user_id,
        email: &email,
        password_hash: &password_hash,
        last_login_at,
    };
    let token = create_action_token(purpose, &state, &test_state(pool.clone()).jwt_config).unwrap();
    (encode_uid(user_id), token)
}
