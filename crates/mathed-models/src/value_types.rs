//! Normalised value types shared by the account tables.
//!
//! # Example
//!
//! ```ignore
//! use mathed_models::value_types::Email;
//!
//! let email: Email = "  Elev@Example.COM ".parse().unwrap();
//! assert_eq!(email.as_str(), "elev@example.com");
//! ```

use serde::{Deserialize, Serialize};
use sqlx::{Database, Decode, Encode, Type, postgres::PgTypeInfo};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::ValidateEmail;

/// Error type for value type parsing failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueTypeError {
    /// The email address is invalid.
    InvalidEmail(String),
}

impl std::error::Error for ValueTypeError {}

impl fmt::Display for ValueTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
        }
    }
}

/// A validated, normalised email address.
///
/// Input is trimmed and lowercased before validation, so two spellings of
/// the same address always compare equal. Account uniqueness relies on this
/// together with the `LOWER(email)` index.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[schema(value_type = String, format = "email", example = "elev@example.com")]
pub struct Email(String);

impl Email {
    /// Normalises and validates an email string.
    pub fn new(email: impl AsRef<str>) -> Result<Self, ValueTypeError> {
        let email = email.as_ref().trim().to_lowercase();
        Self::validate(&email)?;
        Ok(Self(email))
    }

    /// Rows are written through [`Email::new`], so stored values skip revalidation.
    #[inline]
    pub fn new_unchecked(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(email: &str) -> Result<(), ValueTypeError> {
        if email.is_empty() {
            return Err(ValueTypeError::InvalidEmail("email cannot be empty".into()));
        }

        if !email.validate_email() {
            return Err(ValueTypeError::InvalidEmail(format!(
                "'{}' is not a valid email address",
                email
            )));
        }

        Ok(())
    }
}

impl fmt::Debug for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Email({})", self.0)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Email {
    type Err = ValueTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Email {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<Email> for String {
    fn from(email: Email) -> String {
        email.0
    }
}

impl Type<sqlx::Postgres> for Email {
    fn type_info() -> PgTypeInfo {
        <String as Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'q> Encode<'q, sqlx::Postgres> for Email {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> Decode<'r, sqlx::Postgres> for Email {
    fn decode(
        value: <sqlx::Postgres as Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as Decode<'r, sqlx::Postgres>>::decode(value)?;
        Ok(Self::new_unchecked(s))
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_trimmed_and_lowercased() {
        let email = Email::new("  Ana.Pop@Example.RO ").unwrap();
        assert_eq!(email.as_str(), "ana.pop@example.ro");
    }

    #[test]
    fn test_case_variants_compare_equal() {
        let a: Email = "PROF@scoala.ro".parse().unwrap();
        let b: Email = "prof@scoala.ro".parse().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_emails_rejected() {
        assert!(Email::new("").is_err());
        assert!(Email::new("   ").is_err());
        assert!(Email::new("not-an-email").is_err());
        assert!(Email::new("missing@").is_err());
    }

    #[test]
    fn test_deserialize_normalises() {
        let email: Email = serde_json::from_str(r#""Elev@Test.com""#).unwrap();
        assert_eq!(email.as_str(), "elev@test.com");
        assert!(serde_json::from_str::<Email>(r#""nope""#).is_err());
    }

    #[test]
    fn test_serialize_as_plain_string() {
        let email = Email::new("a@b.ro").unwrap();
        assert_eq!(serde_json::to_string(&email).unwrap(), r#""a@b.ro""#);
    }
}
