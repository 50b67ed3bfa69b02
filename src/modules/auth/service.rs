use anyhow::Context;
use chrono::{NaiveDate, Utc};
use mathed_auth::{
    AccountState, ActionPurpose, create_access_token, create_action_token, create_refresh_token,
    decode_uid, encode_uid, verify_action_token, verify_refresh_token,
};
use mathed_config::JwtConfig;
use mathed_core::password::verify_against_dummy;
use mathed_core::{
    AppError, FieldErrorsBuilder, hash_password, password_policy_violations, verify_password,
};
use mathed_models::{
    AccountProfile, ConsentApproveRequest, ConsentStatus, Email, LoginRequest,
    PasswordResetConfirmRequest, PasswordResetRequest, RegisterStudentRequest,
    RegisterTeacherRequest, User, UserType, generate_referral_code, requires_parental_consent,
};
use sqlx::{PgConnection, PgPool};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use super::model::{ConsentOutcome, Session, SessionTokens, StudentRegistration};
use crate::metrics::{
    track_consent_approved, track_login_failure, track_login_success, track_password_reset,
    track_registration, track_token_refresh,
};
use crate::modules::users::service::{USER_COLUMNS, UserService};
use crate::utils::email::EmailService;

const REFERRAL_CODE_ATTEMPTS: usize = 5;

const DUPLICATE_EMAIL: &str = "An account with this email already exists.";
const PASSWORDS_MISMATCH: &str = "Passwords do not match.";
const INVALID_CREDENTIALS: &str = "Invalid email or password.";
const CONSENT_PENDING: &str =
    "Your account is awaiting parental consent. Please ask your parent to check their email.";
const ACCOUNT_INACTIVE: &str = "Your account is inactive. Please contact support.";
const INVALID_CONSENT_LINK: &str = "Invalid or expired consent link.";
const INVALID_RESET_LINK: &str = "Invalid or expired reset link.";
const INVALID_REFRESH: &str = "Invalid or expired refresh token.";

/// Fields common to both registration forms.
struct AccountInput<'a> {
    email: &'a str,
    password: &'a str,
    password_confirm: &'a str,
    first_name: &'a str,
    last_name: &'a str,
}

/// Collects the checks shared by both registration paths and returns the
/// normalised email.
async fn check_account_input(
    db: &mut PgConnection,
    input: &AccountInput<'_>,
    errors: &mut FieldErrorsBuilder,
) -> Result<Option<Email>, AppError> {
    let email = match Email::new(input.email) {
        Ok(email) => Some(email),
        Err(_) => {
            errors.add("email", "Enter a valid email address.");
            None
        }
    };

    if let Some(email) = &email
        && UserService::email_exists(db, email.as_str()).await?
    {
        errors.add("email", DUPLICATE_EMAIL);
    }

    if input.password != input.password_confirm {
        errors.add("password_confirm", PASSWORDS_MISMATCH);
    }

    let email_text = email.as_ref().map(Email::as_str).unwrap_or(input.email);
    errors.extend(
        "password",
        password_policy_violations(
            input.password,
            &[
                ("email address", email_text),
                ("first name", input.first_name),
                ("last name", input.last_name),
            ],
        ),
    );

    Ok(email)
}

fn duplicate_email_or(e: sqlx::Error, context: &'static str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e
        && db_err.is_unique_violation()
    {
        return AppError::field("email", DUPLICATE_EMAIL);
    }
    AppError::database(anyhow::Error::new(e).context(context))
}

/// Semantic checks on a student form that depend on `today`.
fn check_student_dates(
    dto: &RegisterStudentRequest,
    email: Option<&Email>,
    today: NaiveDate,
    errors: &mut FieldErrorsBuilder,
) -> bool {
    if dto.birth_date > today {
        errors.add("birth_date", "Birth date cannot be in the future.");
        return false;
    }

    let requires_consent = requires_parental_consent(dto.birth_date, today);
    if requires_consent {
        match &dto.parent_email {
            None => errors.add("parent_email", "Parent email is required for students under 16."),
            Some(parent) => {
                if let Some(email) = email
                    && parent.trim().eq_ignore_ascii_case(email.as_str())
                {
                    errors.add(
                        "parent_email",
                        "Parent email must be different from student email.",
                    );
                }
            }
        }
    }

    requires_consent
}

fn account_state(user: &User) -> AccountState<'_> {
    AccountState {
        user_id: user.id,
        email: user.email.as_str(),
        password_hash: &user.password,
        last_login_at: user.last_login_at,
    }
}

pub struct AuthService;

impl AuthService {
    /// Signs a session pair and records the refresh `jti`.
    #[instrument(skip(db, user, jwt_config), fields(user.id = %user.id, db.operation = "INSERT", db.table = "refresh_tokens"))]
    pub async fn issue_session(
        db: &mut PgConnection,
        user: &User,
        jwt_config: &JwtConfig,
    ) -> Result<SessionTokens, AppError> {
        let user_type = user.user_type.as_str();
        let access_token =
            create_access_token(user.id, user.email.as_str(), user_type, jwt_config)?;
        let refresh = create_refresh_token(user.id, user.email.as_str(), user_type, jwt_config)?;

        sqlx::query("INSERT INTO refresh_tokens (jti, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(refresh.jti)
            .bind(user.id)
            .bind(refresh.expires_at)
            .execute(db)
            .await
            .context("Failed to store refresh token")
            .map_err(AppError::database)?;

        Ok(SessionTokens {
            access_token,
            refresh_token: refresh.token,
        })
    }

    #[instrument(skip(db, dto, jwt_config, mailer), fields(user.email = %dto.email))]
    pub async fn register_student(
        db: &PgPool,
        dto: RegisterStudentRequest,
        jwt_config: &JwtConfig,
        mailer: &EmailService,
    ) -> Result<StudentRegistration, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let mut errors = FieldErrorsBuilder::new();
        let email = check_account_input(
            &mut *tx,
            &AccountInput {
                email: &dto.email,
                password: &dto.password,
                password_confirm: &dto.password_confirm,
                first_name: &dto.first_name,
                last_name: &dto.last_name,
            },
            &mut errors,
        )
        .await?;
        let requires_consent =
            check_student_dates(&dto, email.as_ref(), Utc::now().date_naive(), &mut errors);
        errors.finish()?;
        let email = email.ok_or_else(|| AppError::field("email", "Enter a valid email address."))?;

        let password_hash = hash_password(&dto.password)?;
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password, first_name, last_name, user_type, is_active)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&email)
        .bind(&password_hash)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(UserType::Student)
        .bind(!requires_consent)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| duplicate_email_or(e, "Failed to create student"))?;

        let parent_email = dto.parent_email.as_deref().map(str::to_lowercase);
        let (consent_status, consent_date) = if requires_consent {
            (ConsentStatus::Pending, None)
        } else {
            (ConsentStatus::Approved, Some(Utc::now()))
        };

        sqlx::query(
            "INSERT INTO student_profiles (user_id, grade, birth_date, parent_email, consent_status, consent_date)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(dto.grade)
        .bind(dto.birth_date)
        .bind(&parent_email)
        .bind(consent_status)
        .bind(consent_date)
        .execute(&mut *tx)
        .await
        .context("Failed to create student profile")
        .map_err(AppError::database)?;

        let outcome = if requires_consent {
            let token = create_action_token(ActionPurpose::Consent, &account_state(&user), jwt_config)?;
            let link = mailer.consent_link(&encode_uid(user.id), &token);
            let student_name = format!("{} {}", user.first_name, user.last_name);
            let parent = parent_email
                .as_deref()
                .ok_or_else(|| AppError::internal_error("Parent email missing"))?;
            mailer
                .send(mailer.consent_request(parent, &student_name, &link))
                .await?;
            StudentRegistration::PendingConsent
        } else {
            let tokens = Self::issue_session(&mut *tx, &user, jwt_config).await?;
            let profile = UserService::load_profile(&mut *tx, &user).await?;
            StudentRegistration::Active(Session {
                user,
                profile,
                tokens,
            })
        };

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;

        info!(requires_consent, "Student registered");
        track_registration(UserType::Student.as_str(), requires_consent);
        Ok(outcome)
    }

    #[instrument(skip(db, dto, jwt_config), fields(user.email = %dto.email))]
    pub async fn register_teacher(
        db: &PgPool,
        dto: RegisterTeacherRequest,
        jwt_config: &JwtConfig,
    ) -> Result<Session, AppError> {
        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let mut errors = FieldErrorsBuilder::new();
        let email = check_account_input(
            &mut *tx,
            &AccountInput {
                email: &dto.email,
                password: &dto.password,
                password_confirm: &dto.password_confirm,
                first_name: &dto.first_name,
                last_name: &dto.last_name,
            },
            &mut errors,
        )
        .await?;
        errors.finish()?;
        let email = email.ok_or_else(|| AppError::field("email", "Enter a valid email address."))?;

        let password_hash = hash_password(&dto.password)?;
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password, first_name, last_name, user_type, is_active)
             VALUES ($1, $2, $3, $4, $5, TRUE)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&email)
        .bind(&password_hash)
        .bind(dto.first_name.trim())
        .bind(dto.last_name.trim())
        .bind(UserType::Teacher)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| duplicate_email_or(e, "Failed to create teacher"))?;

        let school_name = dto.school_name.unwrap_or_default();
        let mut created = false;
        for attempt in 1..=REFERRAL_CODE_ATTEMPTS {
            let code = generate_referral_code(&mut rand::thread_rng());
            let inserted = sqlx::query_scalar::<_, Uuid>(
                "INSERT INTO teacher_profiles (user_id, referral_code, school_name)
                 VALUES ($1, $2, $3)
                 ON CONFLICT (referral_code) DO NOTHING
                 RETURNING user_id",
            )
            .bind(user.id)
            .bind(&code)
            .bind(&school_name)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to create teacher profile")
            .map_err(AppError::database)?;

            if inserted.is_some() {
                created = true;
                break;
            }
            debug!(attempt, "Referral code collision, retrying");
        }

        if !created {
            return Err(AppError::internal_error(
                "Could not allocate a unique referral code",
            ));
        }

        let tokens = Self::issue_session(&mut *tx, &user, jwt_config).await?;
        let profile = UserService::load_profile(&mut *tx, &user).await?;

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;

        info!("Teacher registered");
        track_registration(UserType::Teacher.as_str(), false);
        Ok(Session {
            user,
            profile,
            tokens,
        })
    }

    /// Activates a student from the emailed consent link.
    ///
    /// Approving an already-active account succeeds without touching it.
    #[instrument(skip(db, dto, jwt_config))]
    pub async fn approve_consent(
        db: &PgPool,
        dto: ConsentApproveRequest,
        jwt_config: &JwtConfig,
    ) -> Result<ConsentOutcome, AppError> {
        dto.validate().map_err(|errors| {
            let fields = AppError::from_validation_errors(&errors)
                .fields
                .unwrap_or_default();
            AppError::validation_with_message("Missing uid or token.", fields)
        })?;

        let invalid = || AppError::bad_request(anyhow::anyhow!(INVALID_CONSENT_LINK));
        let (Some(uid), Some(token)) = (dto.uid.as_deref(), dto.token.as_deref()) else {
            return Err(invalid());
        };
        let user_id = decode_uid(uid).ok_or_else(invalid)?;

        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch user")
        .map_err(AppError::database)?
        .filter(|user| user.user_type == UserType::Student)
        .ok_or_else(invalid)?;

        verify_action_token(token, ActionPurpose::Consent, &account_state(&user), jwt_config)
            .map_err(|_| invalid())?;

        if user.is_active {
            debug!(user.id = %user.id, "Consent link reused for active account");
            return Ok(ConsentOutcome::AlreadyActive);
        }

        sqlx::query("UPDATE users SET is_active = TRUE WHERE id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await
            .context("Failed to activate user")
            .map_err(AppError::database)?;

        sqlx::query(
            "UPDATE student_profiles
             SET consent_status = 'approved', consent_date = NOW()
             WHERE user_id = $1",
        )
        .bind(user.id)
        .execute(&mut *tx)
        .await
        .context("Failed to record consent")
        .map_err(AppError::database)?;

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;

        info!(user.id = %user.id, "Parental consent approved");
        track_consent_approved();
        Ok(ConsentOutcome::Approved)
    }

    #[instrument(skip(db, dto, jwt_config), fields(user.email = %dto.email))]
    pub async fn login(
        db: &PgPool,
        dto: LoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<Session, AppError> {
        if dto.email.trim().is_empty() || dto.password.is_empty() {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "Email and password are required."
            )));
        }

        let mut conn = db
            .acquire()
            .await
            .context("Failed to acquire connection")
            .map_err(AppError::database)?;

        let email = dto.email.trim().to_lowercase();
        let Some(user) = UserService::find_by_email(&mut *conn, &email).await? else {
            verify_against_dummy(&dto.password);
            track_login_failure("invalid_credentials");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        };

        if !verify_password(&dto.password, &user.password)? {
            track_login_failure("invalid_credentials");
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let profile = UserService::load_profile(&mut *conn, &user).await?;

        if !user.is_active {
            if let AccountProfile::Student(student) = &profile
                && student.consent_status == ConsentStatus::Pending
            {
                track_login_failure("consent_pending");
                return Err(AppError::forbidden(CONSENT_PENDING));
            }
            track_login_failure("inactive");
            return Err(AppError::forbidden(ACCOUNT_INACTIVE));
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET last_login_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(user.id)
        .fetch_one(&mut *conn)
        .await
        .context("Failed to update last login")
        .map_err(AppError::database)?;

        let tokens = Self::issue_session(&mut *conn, &user, jwt_config).await?;

        track_login_success(user.user_type.as_str());
        Ok(Session {
            user,
            profile,
            tokens,
        })
    }

    /// Exchanges a refresh token for a new pair.
    ///
    /// The presented `jti` is revoked by a single conditional update, so a
    /// token that is replayed concurrently rotates at most once.
    #[instrument(skip(db, refresh_token, jwt_config))]
    pub async fn refresh(
        db: &PgPool,
        refresh_token: Option<&str>,
        jwt_config: &JwtConfig,
    ) -> Result<SessionTokens, AppError> {
        let result = Self::rotate(db, refresh_token, jwt_config).await;
        track_token_refresh(result.is_ok());
        result
    }

    async fn rotate(
        db: &PgPool,
        refresh_token: Option<&str>,
        jwt_config: &JwtConfig,
    ) -> Result<SessionTokens, AppError> {
        let token = refresh_token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AppError::unauthorized("No refresh token found."))?;
        let claims = verify_refresh_token(token, jwt_config)?;

        let invalid = || AppError::unauthorized(INVALID_REFRESH);
        let jti = Uuid::parse_str(&claims.jti).map_err(|_| invalid())?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| invalid())?;

        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        sqlx::query_scalar::<_, Uuid>(
            "UPDATE refresh_tokens SET revoked_at = NOW()
             WHERE jti = $1 AND user_id = $2 AND revoked_at IS NULL AND expires_at > NOW()
             RETURNING user_id",
        )
        .bind(jti)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to rotate refresh token")
        .map_err(AppError::database)?
        .ok_or_else(invalid)?;

        let user = UserService::find_by_id(&mut *tx, user_id)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(invalid)?;

        let tokens = Self::issue_session(&mut *tx, &user, jwt_config).await?;

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;

        Ok(tokens)
    }

    /// Revokes the refresh token if it is valid and belongs to `user_id`.
    /// Anything else is ignored.
    ///
    /// The refresh cookie is scoped to `/api/v1/auth/token/refresh/`, so
    /// browsers never send it to the logout route. Revocation only happens
    /// for clients that pass the refresh token explicitly; browser sessions
    /// rely on the cleared cookies and the refresh token's expiry.
    #[instrument(skip(db, refresh_token, jwt_config), fields(db.operation = "UPDATE", db.table = "refresh_tokens"))]
    pub async fn logout(
        db: &PgPool,
        user_id: Uuid,
        refresh_token: Option<&str>,
        jwt_config: &JwtConfig,
    ) -> Result<(), AppError> {
        let Some(jti) = refresh_token
            .and_then(|token| verify_refresh_token(token, jwt_config).ok())
            .and_then(|claims| Uuid::parse_str(&claims.jti).ok())
        else {
            return Ok(());
        };

        sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW()
             WHERE jti = $1 AND user_id = $2 AND revoked_at IS NULL",
        )
        .bind(jti)
        .bind(user_id)
        .execute(db)
        .await
        .context("Failed to revoke refresh token")
        .map_err(AppError::database)?;

        Ok(())
    }

    /// Emails a reset link to active accounts. Never reveals whether the
    /// address is registered.
    #[instrument(skip(db, dto, jwt_config, mailer))]
    pub async fn request_password_reset(
        db: &PgPool,
        dto: PasswordResetRequest,
        jwt_config: &JwtConfig,
        mailer: &EmailService,
    ) -> Result<(), AppError> {
        let mut conn = db
            .acquire()
            .await
            .context("Failed to acquire connection")
            .map_err(AppError::database)?;

        let email = dto.email.trim().to_lowercase();
        let Some(user) = UserService::find_by_email(&mut *conn, &email)
            .await?
            .filter(|user| user.is_active)
        else {
            debug!("Password reset requested for unknown or inactive account");
            return Ok(());
        };

        let token =
            create_action_token(ActionPurpose::PasswordReset, &account_state(&user), jwt_config)?;
        let link = mailer.reset_link(&encode_uid(user.id), &token);

        if let Err(e) = mailer
            .send(mailer.password_reset(user.email.as_str(), &link))
            .await
        {
            warn!(user.id = %user.id, error = %e.error, "Failed to send password reset email");
            return Ok(());
        }

        track_password_reset("requested");
        Ok(())
    }

    #[instrument(skip(db, dto, jwt_config))]
    pub async fn confirm_password_reset(
        db: &PgPool,
        dto: PasswordResetConfirmRequest,
        jwt_config: &JwtConfig,
    ) -> Result<(), AppError> {
        let invalid = || AppError::bad_request(anyhow::anyhow!(INVALID_RESET_LINK));
        let (Some(uid), Some(token)) = (dto.uid.as_deref(), dto.token.as_deref()) else {
            return Err(invalid());
        };
        let user_id = decode_uid(uid).ok_or_else(invalid)?;

        let mut tx = db
            .begin()
            .await
            .context("Failed to begin transaction")
            .map_err(AppError::database)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch user")
        .map_err(AppError::database)?
        .ok_or_else(invalid)?;

        verify_action_token(
            token,
            ActionPurpose::PasswordReset,
            &account_state(&user),
            jwt_config,
        )
        .map_err(|_| invalid())?;

        let mut errors = FieldErrorsBuilder::new();
        if dto.new_password != dto.new_password_confirm {
            errors.add("new_password_confirm", PASSWORDS_MISMATCH);
        }
        errors.extend(
            "new_password",
            password_policy_violations(
                &dto.new_password,
                &[
                    ("email address", user.email.as_str()),
                    ("first name", &user.first_name),
                    ("last name", &user.last_name),
                ],
            ),
        );
        errors.finish()?;

        let password_hash = hash_password(&dto.new_password)?;
        sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
            .bind(&password_hash)
            .bind(user.id)
            .execute(&mut *tx)
            .await
            .context("Failed to update password")
            .map_err(AppError::database)?;

        let revoked = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW()
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user.id)
        .execute(&mut *tx)
        .await
        .context("Failed to revoke refresh tokens")
        .map_err(AppError::database)?
        .rows_affected();

        tx.commit()
            .await
            .context("Failed to commit transaction")
            .map_err(AppError::database)?;

        info!(user.id = %user.id, revoked, "Password reset completed");
        track_password_reset("completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(birth_date: NaiveDate, parent_email: Option<&str>) -> RegisterStudentRequest {
        RegisterStudentRequest {
            email: "elev@example.com".into(),
            password: "Fractii-Zecimale-42".into(),
            password_confirm: "Fractii-Zecimale-42".into(),
            first_name: "Ana".into(),
            last_name: "Pop".into(),
            grade: 5,
            birth_date,
            parent_email: parent_email.map(String::from),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn email() -> Email {
        Email::new("elev@example.com").unwrap()
    }

    #[test]
    fn test_minor_without_parent_email() {
        let mut errors = FieldErrorsBuilder::new();
        let requires = check_student_dates(
            &student(date(2012, 3, 1), None),
            Some(&email()),
            date(2026, 10, 16),
            &mut errors,
        );
        assert!(requires);
        assert!(errors.has("parent_email"));
    }

    #[test]
    fn test_parent_email_same_as_student() {
        let mut errors = FieldErrorsBuilder::new();
        check_student_dates(
            &student(date(2012, 3, 1), Some("ELEV@example.com")),
            Some(&email()),
            date(2026, 10, 16),
            &mut errors,
        );
        assert!(errors.has("parent_email"));
    }

    #[test]
    fn test_sixteenth_birthday_needs_no_consent() {
        let mut errors = FieldErrorsBuilder::new();
        let requires = check_student_dates(
            &student(date(2010, 10, 16), None),
            Some(&email()),
            date(2026, 10, 16),
            &mut errors,
        );
        assert!(!requires);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_future_birth_date() {
        let mut errors = FieldErrorsBuilder::new();
        check_student_dates(
            &student(date(2027, 1, 1), Some("parinte@example.com")),
            Some(&email()),
            date(2026, 10, 16),
            &mut errors,
        );
        assert!(errors.has("birth_date"));
        assert!(!errors.has("parent_email"));
    }
}
