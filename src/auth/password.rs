use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use tracing::error;

use crate::error::{AccountError, Result};

/// Argon2id hasher shared by every account operation.
#[derive(Clone, Default)]
pub struct PasswordContext {
    argon2: Argon2<'static>,
}

impl PasswordContext {
    pub fn new(argon2: Argon2<'static>) -> Self {
        Self { argon2 }
    }

    pub fn hash(&self, plain: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                AccountError::Password(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    pub fn verify(&self, plain: &str, hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(hash).map_err(|e| {
            error!(error = %e, "argon2 parse hash error");
            AccountError::Password(e.to_string())
        })?;
        Ok(self
            .argon2
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let ctx = PasswordContext::default();
        let password = "Secur3P@ssw0rd!";
        let hash = ctx.hash(password).expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(ctx.verify(password, &hash).expect("verify should succeed"));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let ctx = PasswordContext::default();
        let hash = ctx.hash("correct-horse-battery-staple").unwrap();
        assert!(!ctx.verify("wrong-password", &hash).expect("verify should not error"));
    }

    #[test]
    fn same_password_gets_a_fresh_salt() {
        let ctx = PasswordContext::default();
        assert_ne!(ctx.hash("p1").unwrap(), ctx.hash("p1").unwrap());
    }

    #[test]
    fn verify_errors_on_malformed_hash() {
        let err = PasswordContext::default()
            .verify("anything", "not-a-valid-hash")
            .unwrap_err();
        assert!(matches!(err, AccountError::Password(_)));
    }
}
