//! Stateless bearer session credentials.
//!
//! Login issues a short-lived access token and a longer-lived refresh token,
//! both HS256 JWTs carrying the account id and role. Verification is pure:
//! no server-side session state exists.

use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::accounts::Role;

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    Encode(#[from] jsonwebtoken::errors::Error),

    #[error("Invalid or expired token")]
    Invalid,

    #[error("Wrong token kind presented")]
    WrongKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: i32,
    pub role: Role,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

/// Access + refresh pair handed to the client at login.
#[derive(Debug, Clone, Serialize)]
pub struct SessionTokens {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct SessionTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl SessionTokenService {
    #[must_use]
    pub fn new(secret: &str, access_ttl_minutes: u64, refresh_ttl_days: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl: Duration::minutes(i64::try_from(access_ttl_minutes).unwrap_or(15)),
            refresh_ttl: Duration::days(i64::try_from(refresh_ttl_days).unwrap_or(7)),
        }
    }

    /// Issue a fresh access/refresh pair for an account.
    pub fn issue_pair(&self, account_id: i32, role: Role) -> Result<SessionTokens, JwtError> {
        let now = Utc::now();
        Ok(SessionTokens {
            access: self.sign(account_id, role, TokenKind::Access, now, self.access_ttl)?,
            refresh: self.sign(account_id, role, TokenKind::Refresh, now, self.refresh_ttl)?,
        })
    }

    /// Verify a bearer token and require it to be of the expected kind, so
    /// a refresh token cannot be used as an access token or vice versa.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        validation.validate_exp = true;

        let data =
            decode::<Claims>(token, &self.decoding, &validation).map_err(|_| JwtError::Invalid)?;

        if data.claims.typ != expected {
            return Err(JwtError::WrongKind);
        }

        Ok(data.claims)
    }

    fn sign(
        &self,
        account_id: i32,
        role: Role,
        typ: TokenKind,
        now: chrono::DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let claims = Claims {
            sub: account_id,
            role,
            typ,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }
}
