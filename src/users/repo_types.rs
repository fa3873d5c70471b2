use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::{PasswordContext, TokenKeys},
    error::{AccountError, Result},
};

/// User account as stored in the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserAccount {
    pub id: Option<Uuid>, // assigned by the store on first commit
    pub full_name: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub last_password_updated_at: Option<OffsetDateTime>,
    pub scopes: Vec<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl UserAccount {
    /// Unpersisted record. Timestamps are taken per instance.
    pub fn new(
        email: impl Into<String>,
        full_name: impl Into<String>,
        username: impl Into<String>,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            id: None,
            full_name: full_name.into(),
            email: email.into(),
            username: username.into(),
            hashed_password: None,
            last_password_updated_at: None,
            scopes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// An account without a password (or with an empty hash) never matches.
    pub fn check_password(&self, passwords: &PasswordContext, plain: &str) -> Result<bool> {
        match self.hashed_password.as_deref() {
            Some(hash) if !hash.is_empty() => passwords.verify(plain, hash),
            _ => {
                debug!(username = %self.username, "password check on account without password");
                Ok(false)
            }
        }
    }

    /// Replaces the stored hash. The caller still has to commit the record.
    pub fn set_password(&mut self, passwords: &PasswordContext, plain: &str) -> Result<()> {
        self.hashed_password = Some(passwords.hash(plain)?);
        self.last_password_updated_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }

    pub fn create_access_token(
        &self,
        keys: &TokenKeys,
        expires_delta: Option<Duration>,
    ) -> Result<String> {
        let id = self.id.ok_or(AccountError::NotPersisted)?;
        keys.sign(&id.to_string(), self.scopes.join(" "), expires_delta)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !is_valid_email(&self.email) {
            return Err(AccountError::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JwtConfig;
    use jsonwebtoken::Algorithm;

    fn keys() -> TokenKeys {
        TokenKeys::from(&JwtConfig {
            secret: "test-secret".into(),
            algorithm: Algorithm::HS256,
            ttl_minutes: 15,
        })
    }

    fn persisted() -> UserAccount {
        let mut account = UserAccount::new("a@x.com", "A B", "ab");
        account.id = Some(Uuid::new_v4());
        account
    }

    #[test]
    fn new_account_is_blank() {
        let account = UserAccount::new("a@x.com", "A B", "ab");
        assert!(!account.is_persisted());
        assert!(account.hashed_password.is_none());
        assert!(account.scopes.is_empty());
        assert_eq!(account.created_at, account.updated_at);
    }

    #[test]
    fn timestamps_are_taken_per_instance() {
        let first = UserAccount::new("a@x.com", "A", "a");
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = UserAccount::new("b@x.com", "B", "b");
        assert!(second.created_at > first.created_at);
    }

    #[test]
    fn set_then_check_password() {
        let ctx = PasswordContext::default();
        let mut account = UserAccount::new("a@x.com", "A B", "ab");
        account.set_password(&ctx, "p1").unwrap();
        assert!(account.last_password_updated_at.is_some());
        assert_ne!(account.hashed_password.as_deref(), Some("p1"));
        assert!(account.check_password(&ctx, "p1").unwrap());
        assert!(!account.check_password(&ctx, "wrong").unwrap());
    }

    #[test]
    fn check_password_without_hash_is_false() {
        let account = UserAccount::new("a@x.com", "A B", "ab");
        assert!(!account.check_password(&PasswordContext::default(), "").unwrap());
    }

    #[test]
    fn check_password_with_empty_hash_is_false() {
        let mut account = UserAccount::new("a@x.com", "A B", "ab");
        account.hashed_password = Some(String::new());
        assert!(!account.check_password(&PasswordContext::default(), "").unwrap());
        assert!(!account.check_password(&PasswordContext::default(), "p1").unwrap());
    }

    #[test]
    fn zero_delta_token_gets_default_expiry() {
        let keys = keys();
        let token = persisted()
            .create_access_token(&keys, Some(Duration::ZERO))
            .unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn default_token_expires_after_fifteen_minutes() {
        let keys = keys();
        let account = persisted();
        let token = account.create_access_token(&keys, None).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 15 * 60);
        assert_eq!(claims.sub, account.id.unwrap().to_string());
        assert_eq!(claims.scope, "");
    }

    #[test]
    fn token_scope_is_space_joined() {
        let keys = keys();
        let mut account = persisted();
        account.scopes = vec!["me".into(), "items:read".into()];
        let token = account
            .create_access_token(&keys, Some(Duration::minutes(1)))
            .unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.scope, "me items:read");
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn token_requires_persisted_account() {
        let account = UserAccount::new("a@x.com", "A B", "ab");
        let err = account.create_access_token(&keys(), None).unwrap_err();
        assert!(matches!(err, AccountError::NotPersisted));
    }

    #[test]
    fn hashed_password_is_not_serialized() {
        let mut account = persisted();
        account.set_password(&PasswordContext::default(), "p1").unwrap();
        let json = serde_json::to_string(&account).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(json.contains("\"username\":\"ab\""));
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("a@x.com"));
        assert!(!is_valid_email("a@x"));
        assert!(!is_valid_email("no at.com"));
        assert!(!is_valid_email(""));
    }
}
