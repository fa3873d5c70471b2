use serde::{Deserialize, Serialize};

/// JWT payload of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub exp: i64,      // expires at (unix timestamp)
    pub iat: i64,      // issued at (unix timestamp)
    pub sub: String,   // account id
    pub scope: String, // space separated scopes, may be empty
}

impl AccessClaims {
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split(' ').filter(|s| !s.is_empty())
    }
}
