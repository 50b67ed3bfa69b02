//! Password hashing and password policy.
//!
//! Hashing uses bcrypt at the default cost. The policy mirrors the rules
//! account holders see on the registration and reset forms:
//!
//! - at least [`MIN_PASSWORD_LENGTH`] characters
//! - not entirely numeric
//! - not one of a set of well-known passwords
//! - not too similar to the account's own attributes (email, names)

use std::sync::OnceLock;

use bcrypt::{DEFAULT_COST, hash, verify};

use crate::errors::AppError;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Similarity ratio at or above which a password is rejected.
const MAX_SIMILARITY: f64 = 0.7;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "password1", "password123", "12345678", "123456789", "1234567890",
    "qwertyuiop", "qwerty123", "iloveyou", "sunshine", "princess", "football",
    "baseball", "welcome1", "abc12345", "letmein1", "trustno1", "superman",
    "dragon123", "monkey123", "11111111", "00000000", "asdfghjk", "zaq12wsx",
    "passw0rd", "parola123", "parolamea", "matematica", "romania1", "bucuresti",
];

static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::internal_error(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    verify(password, hash)
        .map_err(|e| AppError::internal_error(format!("Failed to verify password: {}", e)))
}

/// Burns the same bcrypt work as a real verification when no account matched.
pub fn verify_against_dummy(password: &str) {
    let dummy = DUMMY_HASH.get_or_init(|| hash("mathed-timing-equaliser", DEFAULT_COST).ok());
    if let Some(dummy) = dummy {
        let _ = verify(password, dummy);
    }
}

/// Returns every policy message the password violates; empty when it passes.
///
/// `attributes` pairs a human label ("email", "first name") with the value to
/// compare against.
pub fn password_policy_violations(password: &str, attributes: &[(&str, &str)]) -> Vec<String> {
    let mut violations = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        violations.push(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        violations.push("This password is entirely numeric.".to_string());
    }

    let lowered = password.to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.trim()) {
        violations.push("This password is too common.".to_string());
    }

    for (label, value) in attributes {
        if is_too_similar(&lowered, value) {
            violations.push(format!("The password is too similar to the {}.", label));
            break;
        }
    }

    violations
}

fn is_too_similar(password: &str, attribute: &str) -> bool {
    let attribute = attribute.to_lowercase();
    if attribute.is_empty() {
        return false;
    }

    let mut candidates = vec![attribute.as_str()];
    candidates.extend(
        attribute
            .split(|c: char| !c.is_alphanumeric())
            .filter(|part| part.chars().count() >= 3),
    );

    candidates
        .into_iter()
        .any(|candidate| similarity(password, candidate) >= MAX_SIMILARITY)
}

/// `2 * lcs / (len_a + len_b)` over characters.
fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for ca in &a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let lcs = prev[b.len()] as f64;
    2.0 * lcs / (a.len() + b.len()) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hashed = hash_password("Tr1unghiuri!").unwrap();
        assert!(verify_password("Tr1unghiuri!", &hashed).unwrap());
        assert!(!verify_password("wrong-password", &hashed).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(verify_password("anything", "not-a-bcrypt-hash").is_err());
    }

    #[test]
    fn test_strong_password_passes() {
        let violations =
            password_policy_violations("Fractii-Zecimale-42", &[("email", "ana@example.com")]);
        assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn test_short_password() {
        let violations = password_policy_violations("Ab3$x", &[]);
        assert!(violations.iter().any(|v| v.contains("too short")));
    }

    #[test]
    fn test_numeric_password() {
        let violations = password_policy_violations("4815162342", &[]);
        assert_eq!(violations, vec!["This password is entirely numeric.".to_string()]);
    }

    #[test]
    fn test_common_password_case_insensitive() {
        let violations = password_policy_violations("PassWord123", &[]);
        assert!(violations.contains(&"This password is too common.".to_string()));
    }

    #[test]
    fn test_password_similar_to_email() {
        let violations = password_policy_violations(
            "mariapopescu",
            &[("email", "maria.popescu@example.com")],
        );
        assert_eq!(
            violations,
            vec!["The password is too similar to the email.".to_string()]
        );
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert_eq!(similarity("", "abc"), 0.0);
    }
}
