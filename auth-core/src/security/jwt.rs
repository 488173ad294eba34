//! Access token codec and refresh secret generation.
//!
//! Access tokens are compact signed JWTs carrying subject and expiry only.
//! Refresh tokens are opaque random values with no embedded claims; their
//! security property is unguessability plus the server-side row.
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AuthError, Result};

/// 32 bytes of entropy, hex-encoded to 64 characters.
const REFRESH_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID). Optional at the type level so a structurally valid
    /// token without a subject surfaces as `MissingSubject`, not a decode
    /// failure.
    pub sub: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    pub fn subject_id(&self) -> Result<Uuid> {
        let sub = self
            .sub
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(AuthError::MissingSubject)?;
        Uuid::parse_str(sub).map_err(|_| AuthError::InvalidToken)
    }
}

/// Expiry-only view used by the blacklist path, where an expired or
/// `exp`-less token must still decode.
#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

impl TokenCodec {
    /// Build a codec from configuration. Only HMAC-family algorithms are
    /// accepted; the secret is symmetric.
    pub fn new(config: &JwtConfig) -> Result<Self> {
        let algorithm: Algorithm = config.algorithm.parse()?;
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            return Err(AuthError::Token(ErrorKind::InvalidAlgorithm.into()));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm,
            access_token_ttl: Duration::minutes(config.access_token_ttl_minutes),
            refresh_token_ttl: Duration::days(config.refresh_token_ttl_days),
        })
    }

    pub fn issue_access_token(&self, user_id: Uuid) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: Some(user_id.to_string()),
            iat: now.timestamp(),
            exp: (now + self.access_token_ttl).timestamp(),
        };

        Ok(encode(
            &Header::new(self.algorithm),
            &claims,
            &self.encoding_key,
        )?)
    }

    /// Verify signature and expiry. Every rejection - bad signature, garbage
    /// payload, expired - collapses to `InvalidToken`; callers cannot probe
    /// which one it was.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(self.algorithm);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Signature-verified decode that ignores expiry and tolerates a missing
    /// `exp` claim. Used only to compute blacklist TTLs.
    pub fn decode_expiry(&self, token: &str) -> Result<Option<i64>> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<ExpiryClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.exp)
            .map_err(|_| AuthError::InvalidToken)
    }

    /// Generate a new opaque refresh secret and its expiry.
    pub fn issue_refresh_secret(&self) -> (String, DateTime<Utc>) {
        let mut bytes = [0u8; REFRESH_SECRET_BYTES];
        rand::thread_rng().fill_bytes(&mut bytes);

        let token = hex::encode(bytes);
        let expires_at = Utc::now() + self.refresh_token_ttl;
        (token, expires_at)
    }
}
