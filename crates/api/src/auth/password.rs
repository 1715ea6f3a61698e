//! Password storage built on Argon2id.
//!
//! Hashes are kept as PHC strings, so the salt and cost parameters travel
//! with the hash and verification needs no configuration beyond the stored
//! value itself.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Shortest password accepted at signup.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a plaintext password with Argon2id and a fresh random salt.
pub fn hash_password(plaintext: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)?
        .to_string())
}

/// Check `plaintext` against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; `Err` is reserved for a stored hash that
/// cannot be parsed or verified at all, which indicates data corruption
/// rather than a wrong password.
pub fn verify_password(
    plaintext: &str,
    stored: &str,
) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(other) => Err(other),
    }
}

/// Reject passwords shorter than `min_length`.
///
/// The error string is shown to the user as-is.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.len() < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters long"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_password_verifies() {
        let hash = hash_password("ohm's law is v=ir").unwrap();
        assert!(hash.starts_with("$argon2id$"), "hash must be a PHC string");
        assert!(verify_password("ohm's law is v=ir", &hash).unwrap());
    }

    #[test]
    fn mismatch_is_false_not_an_error() {
        let hash = hash_password("the real password").unwrap();
        assert!(!verify_password("a guess", &hash).unwrap());
    }

    #[test]
    fn salts_make_hashes_unique() {
        let a = hash_password("same input").unwrap();
        let b = hash_password("same input").unwrap();
        assert_ne!(a, b, "two hashes of one password must differ by salt");
    }

    #[test]
    fn corrupt_stored_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn length_rule_names_the_minimum() {
        let err = validate_password_strength("2short", MIN_PASSWORD_LENGTH).unwrap_err();
        assert!(err.contains("at least 8 characters"));

        assert!(validate_password_strength("8chars!!", MIN_PASSWORD_LENGTH).is_ok());
    }
}
