//! Admin account creation.
//!
//! Admins have no profile row and cannot self-register, so this is the only
//! way to create one.

use mathed_core::{hash_password, password_policy_violations};
use mathed_models::{Email, UserType};
use sqlx::PgPool;
use uuid::Uuid;

/// Creates an active admin. Fails if the email is taken or the password
/// breaks the policy.
pub async fn create_admin(
    db: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<Uuid, Box<dyn std::error::Error>> {
    let email = Email::new(email)?;

    let violations = password_policy_violations(
        password,
        &[
            ("first name", first_name),
            ("last name", last_name),
            ("email", email.as_str()),
        ],
    );
    if !violations.is_empty() {
        return Err(violations.join(" ").into());
    }

    let hashed_password =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let user_id = sqlx::query_scalar::<_, Uuid>(
        "INSERT INTO users (first_name, last_name, email, password, user_type)
         VALUES ($1, $2, $3, $4, $5)
         ON CONFLICT ((LOWER(email))) DO NOTHING
         RETURNING id",
    )
    .bind(first_name.trim())
    .bind(last_name.trim())
    .bind(&email)
    .bind(&hashed_password)
    .bind(UserType::Admin)
    .fetch_optional(db)
    .await?;

    user_id.ok_or_else(|| "User with this email already exists".into())
}
