use anyhow::Context;
use mathed_core::AppError;
use mathed_models::{AccountProfile, StudentProfile, TeacherProfile, User, UserType};
use sqlx::{PgConnection, PgPool};
use tracing::instrument;
use uuid::Uuid;

pub(crate) const USER_COLUMNS: &str = "id, email, password, first_name, last_name, user_type, \
     is_active, last_login_at, created_at, updated_at";

pub struct UserService;

impl UserService {
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn find_by_id(db: &mut PgConnection, user_id: Uuid) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(db)
            .await
            .context("Failed to fetch user")
            .map_err(AppError::database)
    }

    /// Case-insensitive lookup. `email` should already be normalised.
    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn find_by_email(db: &mut PgConnection, email: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
        .context("Failed to fetch user by email")
        .map_err(AppError::database)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn email_exists(db: &mut PgConnection, email: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))",
        )
        .bind(email)
        .fetch_one(db)
        .await
        .context("Failed to check email")
        .map_err(AppError::database)
    }

    /// Loads the role-specific profile of `user`.
    ///
    /// A student or teacher without a profile row is a data error (500).
    #[instrument(skip(db, user), fields(user.id = %user.id, user.user_type = %user.user_type))]
    pub async fn load_profile(db: &mut PgConnection, user: &User) -> Result<AccountProfile, AppError> {
        match user.user_type {
            UserType::Student => {
                let profile = sqlx::query_as::<_, StudentProfile>(
                    "SELECT user_id, grade, birth_date, parent_email, consent_status, consent_date
                     FROM student_profiles WHERE user_id = $1",
                )
                .bind(user.id)
                .fetch_optional(db)
                .await
                .context("Failed to fetch student profile")
                .map_err(AppError::database)?
                .ok_or_else(|| AppError::internal_error("Student profile missing"))?;

                Ok(AccountProfile::Student(profile))
            }
            UserType::Teacher => {
                let profile = sqlx::query_as::<_, TeacherProfile>(
                    "SELECT user_id, referral_code, commission_rate::FLOAT8 AS commission_rate, school_name
                     FROM teacher_profiles WHERE user_id = $1",
                )
                .bind(user.id)
                .fetch_optional(db)
                .await
                .context("Failed to fetch teacher profile")
                .map_err(AppError::database)?
                .ok_or_else(|| AppError::internal_error("Teacher profile missing"))?;

                Ok(AccountProfile::Teacher(profile))
            }
            UserType::Admin => Ok(AccountProfile::Admin),
        }
    }

    /// The authenticated caller's account and profile.
    ///
    /// A token for a deleted or deactivated account is treated as invalid.
    #[instrument(skip(db))]
    pub async fn get_account(db: &PgPool, user_id: Uuid) -> Result<(User, AccountProfile), AppError> {
        let mut conn = db
            .acquire()
            .await
            .context("Failed to acquire connection")
            .map_err(AppError::database)?;

        let user = Self::find_by_id(&mut *conn, user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::unauthorized("User not found or inactive."))?;

        let profile = Self::load_profile(&mut *conn, &user).await?;
        Ok((user, profile))
    }
}
