use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::warn;

/// Result of comparing a submitted password with the hash on a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordCheck {
    Match,
    Mismatch,
    /// The stored value is empty or not a PHC string, so nothing can match it.
    Unusable,
}

/// Argon2id with a fresh salt per call. Empty passwords are never hashed.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    if plain.is_empty() {
        anyhow::bail!("refusing to hash an empty password");
    }
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("argon2 hashing failed: {e}"))
}

pub fn check_password(plain: &str, stored_hash: &str) -> PasswordCheck {
    if stored_hash.is_empty() {
        return PasswordCheck::Unusable;
    }
    let parsed = match PasswordHash::new(stored_hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(error = %e, "stored password hash does not parse");
            return PasswordCheck::Unusable;
        }
    };
    if plain.is_empty() {
        return PasswordCheck::Mismatch;
    }
    match Argon2::default().verify_password(plain.as_bytes(), &parsed) {
        Ok(()) => PasswordCheck::Match,
        Err(_) => PasswordCheck::Mismatch,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_password_matches_only_itself() {
        let hash = hash_password("correct-horse").expect("hash");
        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(check_password("correct-horse", &hash), PasswordCheck::Match);
        assert_eq!(check_password("correct-horsE", &hash), PasswordCheck::Mismatch);
        assert_eq!(check_password("", &hash), PasswordCheck::Mismatch);
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash_password("pw").unwrap();
        let b = hash_password("pw").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn empty_password_is_not_hashed() {
        assert!(hash_password("").is_err());
    }

    #[test]
    fn empty_or_foreign_stored_values_are_unusable() {
        assert_eq!(check_password("pw", ""), PasswordCheck::Unusable);
        assert_eq!(check_password("plaintext", "plaintext"), PasswordCheck::Unusable);
    }
}
