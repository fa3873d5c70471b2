use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::{
    error::{AccountError, Result},
    users::repo_types::UserAccount,
};

/// Persistence port for accounts. Uniqueness of `email` and `username` is the
/// store's job; violations come back as [`AccountError::Duplicate`].
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>>;
    /// Inserts a new record and returns the id the store assigned.
    async fn insert(&self, account: &UserAccount) -> Result<Uuid>;
    async fn update(&self, account: &UserAccount) -> Result<()>;
}

const COLUMNS: &str = "id, full_name, email, username, hashed_password, \
                       last_password_updated_at, scopes, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserAccount>> {
        let user = sqlx::query_as::<_, UserAccount>(&format!(
            "SELECT {COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        let user = sqlx::query_as::<_, UserAccount>(&format!(
            "SELECT {COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    #[instrument(skip(self, account), fields(username = %account.username))]
    async fn insert(&self, account: &UserAccount) -> Result<Uuid> {
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO users (full_name, email, username, hashed_password,
                               last_password_updated_at, scopes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&account.full_name)
        .bind(&account.email)
        .bind(&account.username)
        .bind(&account.hashed_password)
        .bind(account.last_password_updated_at)
        .bind(&account.scopes)
        .bind(account.created_at)
        .bind(account.updated_at)
        .fetch_one(&self.db)
        .await
        .map_err(map_write_error)?;
        Ok(id)
    }

    #[instrument(skip(self, account), fields(id = ?account.id))]
    async fn update(&self, account: &UserAccount) -> Result<()> {
        let id = account.id.ok_or(AccountError::NotPersisted)?;
        let done = sqlx::query(
            r#"
            UPDATE users
               SET full_name = $2, email = $3, username = $4, hashed_password = $5,
                   last_password_updated_at = $6, scopes = $7, updated_at = $8
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&account.full_name)
        .bind(&account.email)
        .bind(&account.username)
        .bind(&account.hashed_password)
        .bind(account.last_password_updated_at)
        .bind(&account.scopes)
        .bind(account.updated_at)
        .execute(&self.db)
        .await
        .map_err(map_write_error)?;
        if done.rows_affected() == 0 {
            return Err(AccountError::NotFound(id));
        }
        Ok(())
    }
}

/// SQLSTATE 23505 is a unique violation; the constraint name tells which field.
fn map_write_error(err: sqlx::Error) -> AccountError {
    let field = match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            match db_err.constraint() {
                Some("users_email_key") => Some("email"),
                Some("users_username_key") => Some("username"),
                other => {
                    warn!(constraint = ?other, "unique violation on unexpected constraint");
                    None
                }
            }
        }
        _ => None,
    };
    match field {
        Some(field) => AccountError::Duplicate { field },
        None => AccountError::Database(err),
    }
}
