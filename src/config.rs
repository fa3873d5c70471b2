use std::str::FromStr;

use anyhow::Context;
use jsonwebtoken::Algorithm;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let algorithm = match std::env::var("JWT_ALGORITHM") {
            Ok(v) => parse_algorithm(&v)?,
            Err(_) => Algorithm::HS256,
        };
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            algorithm,
            ttl_minutes: match std::env::var("JWT_TTL_MINUTES") {
                Ok(v) => parse_ttl_minutes(&v)?,
                Err(_) => 15,
            },
        };
        let max_connections = std::env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        Ok(Self {
            database_url,
            max_connections,
            jwt,
        })
    }
}

/// One year.
const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

fn parse_ttl_minutes(raw: &str) -> anyhow::Result<i64> {
    let minutes = raw
        .trim()
        .parse::<i64>()
        .map_err(|e| anyhow::anyhow!("invalid JWT_TTL_MINUTES {raw:?}: {e}"))?;
    if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
        anyhow::bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {minutes}");
    }
    Ok(minutes)
}

/// Only the HMAC family can sign with a shared secret.
fn parse_algorithm(raw: &str) -> anyhow::Result<Algorithm> {
    let alg = Algorithm::from_str(raw.trim())
        .map_err(|e| anyhow::anyhow!("invalid JWT_ALGORITHM {raw:?}: {e}"))?;
    match alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(alg),
        other => anyhow::bail!("JWT_ALGORITHM {other:?} needs a key pair, not a secret"),
    }
}
