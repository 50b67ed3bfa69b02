//! Session token creation and verification.
//!
//! Access and refresh tokens are HS256 JWTs signed with [`JwtConfig::secret`].
//! Each token is stamped with its [`TokenKind`], and verification rejects the
//! other kind.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use mathed_config::JwtConfig;
use mathed_core::AppError;

use crate::claims::{Claims, RefreshTokenClaims, TokenKind};

/// A freshly signed refresh token together with what the revocation store needs.
#[derive(Debug, Clone)]
pub struct IssuedRefreshToken {
    pub token: String,
    pub jti: Uuid,
    pub expires_at: DateTime<Utc>,
}

/// Creates a short-lived access token.
///
/// # Errors
///
/// Returns an internal error if token encoding fails.
pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    user_type: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let issued_at = Utc::now();
    let expires_at = issued_at + Duration::seconds(jwt_config.access_token_expiry);

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        user_type: user_type.to_string(),
        token_type: TokenKind::Access,
        exp: expires_at.timestamp().max(0) as usize,
        iat: issued_at.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create token: {}", e)))
}

/// Verifies an access token and returns the embedded claims.
///
/// # Errors
///
/// Returns an unauthorized error if the signature is invalid, the token has
/// expired, is malformed, or is a refresh token.
pub fn verify_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired token"))?;

    if claims.token_type != TokenKind::Access {
        return Err(AppError::unauthorized("Invalid or expired token"));
    }

    Ok(claims)
}

/// Creates a refresh token with a fresh `jti`.
///
/// The caller is responsible for recording `jti` and `expires_at` so the
/// token can be rotated and revoked.
pub fn create_refresh_token(
    user_id: Uuid,
    email: &str,
    user_type: &str,
    jwt_config: &JwtConfig,
) -> Result<IssuedRefreshToken, AppError> {
    let issued_at = Utc::now();
    let expires_at = issued_at + Duration::seconds(jwt_config.refresh_token_expiry);
    let jti = Uuid::new_v4();

    let claims = RefreshTokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        user_type: user_type.to_string(),
        token_type: TokenKind::Refresh,
        exp: expires_at.timestamp() as usize,
        iat: issued_at.timestamp() as usize,
        jti: jti.to_string(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_config.secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create refresh token: {}", e)))?;

    Ok(IssuedRefreshToken {
        token,
        jti,
        expires_at,
    })
}

/// Verifies a refresh token's signature, expiry and kind.
///
/// Revocation is not checked here; that happens against the token store.
pub fn verify_refresh_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<RefreshTokenClaims, AppError> {
    let claims = decode::<RefreshTokenClaims>(
        token,
        &DecodingKey::from_secret(jwt_config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::unauthorized("Invalid or expired refresh token."))?;

    if claims.token_type != TokenKind::Refresh {
        return Err(AppError::unauthorized("Invalid or expired refresh token."));
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 1800,
            refresh_token_expiry: 604800,
            action_token_expiry: 259200,
        }
    }

    #[test]
    fn test_verify_token_success() {
        let config = get_test_jwt_config();
        let user_id = Uuid::new_v4();

        let token = create_access_token(user_id, "elev@example.com", "student", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "elev@example.com");
        assert_eq!(claims.user_type, "student");
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn test_verify_token_invalid() {
        let config = get_test_jwt_config();
        assert!(verify_token("invalid-token", &config).is_err());
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let config = get_test_jwt_config();
        let token =
            create_access_token(Uuid::new_v4(), "elev@example.com", "student", &config).unwrap();

        let wrong_config = JwtConfig {
            secret: "different-secret-key-at-least-32-characters".to_string(),
            ..get_test_jwt_config()
        };

        assert!(verify_token(&token, &wrong_config).is_err());
    }

    #[test]
    fn test_expired_access_token_rejected() {
        let config = JwtConfig {
            access_token_expiry: -3600,
            ..get_test_jwt_config()
        };
        let token =
            create_access_token(Uuid::new_v4(), "elev@example.com", "student", &config).unwrap();
        let err = verify_token(&token, &config).unwrap_err();
        assert_eq!(err.status.as_u16(), 401);
    }

    #[test]
    fn test_access_token_lifetime_follows_config() {
        let config = get_test_jwt_config();
        let token =
            create_access_token(Uuid::new_v4(), "elev@example.com", "student", &config).unwrap();
        let claims = verify_token(&token, &config).unwrap();
        assert_eq!(
            (claims.exp - claims.iat) as i64,
            config.access_token_expiry
        );
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let config = get_test_jwt_config();
        let user_id = Uuid::new_v4();

        let issued = create_refresh_token(user_id, "prof@example.com", "teacher", &config).unwrap();
        let claims = verify_refresh_token(&issued.token, &config).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.jti, issued.jti.to_string());
        assert_eq!(claims.exp, issued.expires_at.timestamp() as usize);
    }

    #[test]
    fn test_refresh_tokens_have_unique_jti() {
        let config = get_test_jwt_config();
        let user_id = Uuid::new_v4();

        let a = create_refresh_token(user_id, "a@example.com", "student", &config).unwrap();
        let b = create_refresh_token(user_id, "a@example.com", "student", &config).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let config = get_test_jwt_config();
        let user_id = Uuid::new_v4();

        let access = create_access_token(user_id, "a@example.com", "student", &config).unwrap();
        let refresh = create_refresh_token(user_id, "a@example.com", "student", &config).unwrap();

        assert!(verify_refresh_token(&access, &config).is_err());
        assert!(verify_token(&refresh.token, &config).is_err());
    }
}
