//! Argon2id password hashing, verification, and strength validation.
//!
//! All password hashes use the Argon2id variant with a cryptographically random
//! salt generated via [`OsRng`]. The PHC string format is used for storage so
//! that algorithm parameters and salt are embedded in the hash itself.

use std::sync::LazyLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Characters that count as symbols for [`password_is_secure`].
pub const PASSWORD_SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:'\",.<>/?\\|`~";

/// Hash a plaintext password using Argon2id with a random salt.
///
/// Returns the PHC-formatted hash string (includes algorithm, params, salt, and hash).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC-formatted Argon2id hash.
///
/// Returns `Ok(true)` if the password matches, `Ok(false)` if it does not.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Hash checked when a login names no known account, so that branch pays the
/// same Argon2 cost as a wrong password.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("logit-unknown-account").unwrap_or_default());

/// Verify `password` against `stored`, or against a fixed dummy hash when
/// there is no stored hash. The dummy branch always reports a mismatch.
pub fn verify_password_or_dummy(
    password: &str,
    stored: Option<&str>,
) -> Result<bool, argon2::password_hash::Error> {
    match stored {
        Some(hash) => verify_password(password, hash),
        None => verify_password(password, &DUMMY_HASH).map(|_| false),
    }
}

/// Whether `password` satisfies the account password policy: at least
/// [`MIN_PASSWORD_LENGTH`] characters with an uppercase letter, a lowercase
/// letter, a digit and one of [`PASSWORD_SYMBOLS`].
pub fn password_is_secure(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "Correct-Horse-9";
        let hash = hash_password(password).expect("hashing should succeed");

        assert!(
            hash.starts_with("$argon2id$"),
            "expected argon2id PHC prefix"
        );

        let verified = verify_password(password, &hash).expect("verify should succeed");
        assert!(verified, "correct password should verify as true");
    }

    #[test]
    fn test_wrong_password_fails() {
        let hash = hash_password("Real-Password-1").expect("hashing should succeed");
        let verified = verify_password("Wrong-Password-1", &hash).expect("verify should succeed");
        assert!(!verified, "wrong password should verify as false");
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let a = hash_password("Same-Password-1").unwrap();
        let b = hash_password("Same-Password-1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_secure_password_accepted() {
        assert!(password_is_secure("Abcdef1!"));
        assert!(password_is_secure("Tr0ub4dor&3"));
        assert!(password_is_secure("Back\\slash9x"));
    }

    #[test]
    fn test_each_rule_is_enforced() {
        assert!(!password_is_secure("Abcde1!"), "too short");
        assert!(!password_is_secure("abcdef1!"), "no uppercase");
        assert!(!password_is_secure("ABCDEF1!"), "no lowercase");
        assert!(!password_is_secure("Abcdefg!"), "no digit");
        assert!(!password_is_secure("Abcdefg1"), "no symbol");
        assert!(!password_is_secure("Abcdef1 "), "space is not a symbol");
    }

    #[test]
    fn test_missing_account_runs_full_verification() {
        // The dummy hash carries the same Argon2 parameters as real hashes.
        let real = hash_password("Real-Password-1").unwrap();
        let real = PasswordHash::new(&real).unwrap();
        let dummy = PasswordHash::new(&DUMMY_HASH).unwrap();
        assert_eq!(dummy.algorithm, real.algorithm);
        assert_eq!(dummy.params, real.params);

        assert_eq!(verify_password_or_dummy("Real-Password-1", None), Ok(false));
        assert_eq!(
            verify_password_or_dummy("logit-unknown-account", None),
            Ok(false)
        );
    }

    #[test]
    fn test_stored_hash_is_used_when_present() {
        let hash = hash_password("Real-Password-1").unwrap();
        assert_eq!(verify_password_or_dummy("Real-Password-1", Some(&hash)), Ok(true));
        assert_eq!(verify_password_or_dummy("Wrong-Password-1", Some(&hash)), Ok(false));
    }
}
