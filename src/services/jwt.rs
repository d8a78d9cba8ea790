//! Token codec: signs and verifies the access/refresh/control JWTs.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;
use crate::models::{RefreshTokenRecord, User};

/// HS256 codec over the two shared secrets. The control token is signed with
/// the refresh secret since it shares the refresh token's lifetime.
#[derive(Clone)]
pub struct JwtService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_minutes: i64,
    refresh_ttl_days: i64,
}

/// Claims for access tokens (short-lived)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Claims for refresh tokens (long-lived, single-use)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Opaque token identifier (matches the ledger entry)
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

/// Claims for the control token: no identity, only a lifetime. The cookie's
/// presence is the signal; it is a client-side hint, not a credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlTokenClaims {
    pub exp: i64,
    pub iat: i64,
}

/// Decode failures, split for logging. Control flow treats both as failure.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(err),
        }
    }
}

/// A freshly issued session: the three transmitted tokens plus the ledger
/// record backing the refresh token. The caller persists the record.
#[derive(Debug)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub control_token: String,
    pub record: RefreshTokenRecord,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl_minutes: config.access_ttl_minutes,
            refresh_ttl_days: config.refresh_ttl_days,
        }
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user: &User) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::minutes(self.access_ttl_minutes);

        let claims = AccessTokenClaims {
            sub: user.user_id.to_string(),
            username: user.username.clone(),
            role: user.role.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.access_encoding)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))
    }

    /// Generate a refresh token bound to a ledger entry identifier
    pub fn generate_refresh_token(
        &self,
        user_id: &str,
        token_id: &str,
    ) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::days(self.refresh_ttl_days);

        let claims = RefreshTokenClaims {
            sub: user_id.to_string(),
            jti: token_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|e| anyhow::anyhow!("Failed to encode refresh token: {}", e))
    }

    /// Generate a control token (same lifetime as the refresh token)
    pub fn generate_control_token(&self) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now + Duration::days(self.refresh_ttl_days);

        let claims = ControlTokenClaims {
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh_encoding)
            .map_err(|e| anyhow::anyhow!("Failed to encode control token: {}", e))
    }

    /// Issue the full access/refresh/control triple for a user, together
    /// with the ledger record the refresh token is bound to.
    pub fn issue_session(&self, user: &User) -> Result<SessionTokens, anyhow::Error> {
        let record = RefreshTokenRecord::new(user.user_id, self.refresh_ttl_days);

        Ok(SessionTokens {
            access_token: self.generate_access_token(user)?,
            refresh_token: self
                .generate_refresh_token(&user.user_id.to_string(), &record.token_id)?,
            control_token: self.generate_control_token()?,
            record,
        })
    }

    /// Validate and decode an access token
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<AccessTokenClaims>(token, &self.access_decoding, &validation)?;
        Ok(token_data.claims)
    }

    /// Validate and decode a refresh token
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let token_data = decode::<RefreshTokenClaims>(token, &self.refresh_decoding, &validation)?;
        Ok(token_data.claims)
    }
}
