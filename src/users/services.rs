use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    auth::{PasswordContext, TokenKeys},
    config::JwtConfig,
    error::Result,
    users::{repo::UserStore, repo_types::UserAccount},
};

/// Account operations over a [`UserStore`], with the hashing and signing
/// collaborators passed in explicitly.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn UserStore>,
    passwords: PasswordContext,
    tokens: TokenKeys,
}

impl AccountService {
    pub fn new(store: Arc<dyn UserStore>, passwords: PasswordContext, tokens: TokenKeys) -> Self {
        Self {
            store,
            passwords,
            tokens,
        }
    }

    pub fn from_config(store: Arc<dyn UserStore>, jwt: &JwtConfig) -> Self {
        Self::new(store, PasswordContext::default(), TokenKeys::from(jwt))
    }

    pub fn passwords(&self) -> &PasswordContext {
        &self.passwords
    }

    pub fn tokens(&self) -> &TokenKeys {
        &self.tokens
    }

    /// Malformed ids are treated like missing ones.
    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<UserAccount>> {
        let Ok(id) = Uuid::parse_str(id) else {
            debug!("malformed account id");
            return Ok(None);
        };
        self.store.find_by_id(id).await
    }

    #[instrument(skip(self))]
    pub async fn get_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        self.store.find_by_username(username).await
    }

    /// Inserts the record if it has no id yet, otherwise writes it over the
    /// stored one and bumps `updated_at`.
    #[instrument(skip(self, account), fields(username = %account.username))]
    pub async fn commit(&self, account: &mut UserAccount) -> Result<()> {
        account.validate()?;
        if account.is_persisted() {
            account.updated_at = OffsetDateTime::now_utc();
            self.store.update(account).await
        } else {
            let id = self.store.insert(account).await?;
            account.id = Some(id);
            Ok(())
        }
    }

    #[instrument(skip(self, password))]
    pub async fn register_new_user(
        &self,
        email: &str,
        full_name: &str,
        username: &str,
        password: &str,
    ) -> Result<UserAccount> {
        let mut account = UserAccount::new(email, full_name, username);
        account.set_password(&self.passwords, password)?;
        self.commit(&mut account).await?;
        info!(id = ?account.id, "account registered");
        Ok(account)
    }

    pub fn check_password(&self, account: &UserAccount, plain: &str) -> Result<bool> {
        account.check_password(&self.passwords, plain)
    }

    pub fn set_password(&self, account: &mut UserAccount, plain: &str) -> Result<()> {
        account.set_password(&self.passwords, plain)
    }

    pub fn create_access_token(
        &self,
        account: &UserAccount,
        expires_delta: Option<time::Duration>,
    ) -> Result<String> {
        account.create_access_token(&self.tokens, expires_delta)
    }
}
