use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{
    auth::claims::AccessClaims,
    config::JwtConfig,
    error::{AccountError, Result},
};

/// Signing and verification keys for access tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
}

impl From<&JwtConfig> for TokenKeys {
    fn from(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            access_ttl: Duration::seconds(cfg.ttl_minutes.saturating_mul(60)),
        }
    }
}

impl TokenKeys {
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Signs `{exp, iat, sub, scope}` with `exp = now + ttl`. A missing or zero
    /// `ttl` falls back to the configured access TTL; negative values are kept.
    pub fn sign(&self, subject: &str, scope: String, ttl: Option<Duration>) -> Result<String> {
        let now = OffsetDateTime::now_utc();
        let ttl = ttl.filter(|d| !d.is_zero()).unwrap_or(self.access_ttl);
        let exp = now
            .checked_add(ttl)
            .ok_or(AccountError::ExpiryOutOfRange(ttl))?;
        let claims = AccessClaims {
            exp: exp.unix_timestamp(),
            iat: now.unix_timestamp(),
            sub: subject.to_string(),
            scope,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)?;
        debug!(sub = %subject, alg = ?self.algorithm, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<AccessClaims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);
        let data = decode::<AccessClaims>(token, &self.decoding, &validation)?;
        debug!(sub = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}
