use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, AccountError>;

#[derive(Debug, Error)]
pub enum AccountError {
    /// A unique column (`email` or `username`) already holds this value.
    #[error("{field} is already taken")]
    Duplicate { field: &'static str },

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("account has not been persisted yet")]
    NotPersisted,

    #[error("account {0} not found")]
    NotFound(Uuid),

    #[error("token expiry out of range: {0}")]
    ExpiryOutOfRange(time::Duration),

    #[error("password hashing failed: {0}")]
    Password(String),

    #[error(transparent)]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
