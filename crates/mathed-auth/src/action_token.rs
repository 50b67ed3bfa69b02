//! Single-purpose tokens for emailed links.
//!
//! An action token is a signed JWT carrying a purpose and a fingerprint of the
//! account's credential state. Any change to the password hash, the last
//! login timestamp or the email changes the fingerprint, so a link stops
//! working as soon as it has been used (consent activates and the student
//! logs in; a reset changes the password) or the account moved on.
//!
//! `is_active` is deliberately left out of the fingerprint: a consent link
//! that is clicked twice must still verify so the second click can report
//! that the account is already active.

use chrono::{DateTime, Duration, Utc};
use data_encoding::BASE64URL_NOPAD;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use mathed_config::JwtConfig;
use mathed_core::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPurpose {
    Consent,
    PasswordReset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionTokenClaims {
    pub sub: String,
    pub purpose: ActionPurpose,
    /// Hex SHA-256 of the account state at issue time.
    pub fgp: String,
    pub exp: usize,
    pub iat: usize,
}

/// The slice of an account that an action token is bound to.
#[derive(Debug, Clone, Copy)]
pub struct AccountState<'a> {
    pub user_id: Uuid,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl AccountState<'_> {
    pub fn fingerprint(&self) -> String {
        let last_login = self
            .last_login_at
            .map(|ts| ts.timestamp_micros().to_string())
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(self.user_id.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(self.password_hash.as_bytes());
        hasher.update(b"|");
        hasher.update(last_login.as_bytes());
        hasher.update(b"|");
        hasher.update(self.email.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Signs an action token valid for [`JwtConfig::action_token_expiry`] seconds.
pub fn create_action_token(
    purpose: ActionPurpose,
    state: &AccountState<'_>,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = ActionTokenClaims {
        sub: state.user_id.to_string(),
        purpose,
        fgp: state.fingerprint(),
        exp: (now + Duration::seconds(jwt_config.action_token_expiry)).timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create action token: {}", e)))
}

/// Checks signature, expiry, purpose, subject and fingerprint.
///
/// Every failure is the same opaque 400; callers substitute the message
/// their endpoint shows.
pub fn verify_action_token(
    token: &str,
    purpose: ActionPurpose,
    state: &AccountState<'_>,
    jwt_config: &JwtConfig,
) -> Result<(), AppError> {
    let invalid = || AppError::bad_request(anyhow::anyhow!("Invalid or expired link."));

    let claims = decode::<ActionTokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| invalid())?;

    if claims.purpose != purpose
        || claims.sub != state.user_id.to_string()
        || claims.fgp != state.fingerprint()
    {
        return Err(invalid());
    }

    Ok(())
}

/// URL-safe encoding of a user id for emailed links.
pub fn encode_uid(user_id: Uuid) -> String {
    BASE64URL_NOPAD.encode(user_id.to_string().as_bytes())
}

/// Inverse of [`encode_uid`]. `None` for anything that is not an encoded UUID.
pub fn decode_uid(uid: &str) -> Option<Uuid> {
    let bytes = BASE64URL_NOPAD.decode(uid.trim().as_bytes()).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    Uuid::parse_str(&text).ok()
}
