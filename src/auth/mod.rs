mod claims;
mod jwt;
mod password;

pub use claims::AccessClaims;
pub use jwt::TokenKeys;
pub use password::PasswordContext;
