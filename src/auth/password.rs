use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use lazy_static::lazy_static;

use crate::errors::AppError;

lazy_static! {
    /// Argon2id, memory=19456 KiB, iterations=2, parallelism=1
    static ref ARGON2: Argon2<'static> = Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(19456, 2, 1, None).expect("Invalid Argon2 params")
    );

    /// Verified against when the username is unknown so both paths cost one hash
    static ref DUMMY_HASH: Option<String> = hash_password("moneybook-dummy-password").ok();
}

/// Hash a password into a PHC string
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    ARGON2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::InternalError(format!("Failed to hash password: {e}")))
}

/// Check a password against a stored PHC string
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::InternalError(format!("Invalid password hash: {e}")))?;
    Ok(ARGON2
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Spend one verification on a throwaway hash
pub fn verify_against_dummy(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_argon2id_phc_string() {
        let hash = hash_password("Password123").expect("Should hash password");
        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hash1 = hash_password("Password123").expect("Should hash password");
        let hash2 = hash_password("Password123").expect("Should hash password");
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("Password123").expect("Should hash password");
        assert!(verify_password("Password123", &hash).expect("Should verify"));
        assert!(!verify_password("Password124", &hash).expect("Should verify"));
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        assert!(verify_password("Password123", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_dummy_hash_is_usable() {
        let hash = DUMMY_HASH.as_deref().expect("Dummy hash should be computed");
        assert!(verify_password("moneybook-dummy-password", hash).expect("Should verify"));
        verify_against_dummy("anything");
    }
}
