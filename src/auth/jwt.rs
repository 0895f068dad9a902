use std::time::Duration;

use anyhow::Context;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{
    auth::errors::AuthError,
    config::{clamp_ttl_minutes, JwtConfig},
};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Signed payload of a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub exp: usize,  // unix seconds, UTC
}

/// HS256 signing and verification keys, built once from the process secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self::new(
            cfg.secret.as_bytes(),
            Duration::from_secs(clamp_ttl_minutes(cfg.ttl_minutes) as u64 * 60),
        )
    }

    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    /// Mint a token for `subject` that expires `ttl` from now.
    pub fn issue(&self, subject: &str) -> anyhow::Result<String> {
        let ttl = i64::try_from(self.ttl.as_secs()).context("token ttl out of range")?;
        let exp = OffsetDateTime::now_utc()
            .checked_add(TimeDuration::seconds(ttl))
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: subject.to_owned(),
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)?;
        debug!(sub = %subject, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    /// Check signature, algorithm and expiry and return the subject.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            debug!(error = %e, "jwt rejected");
            AuthError::InvalidToken
        })?;
        Ok(data.claims.sub)
    }
}
