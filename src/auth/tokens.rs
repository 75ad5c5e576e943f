// src/auth/tokens.rs
//! Session and pending-registration token issuing and verification

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::models::{
    RegistrationClaims, SessionClaims, TokenKind, VerifiedClaims, REGISTRATION_AUDIENCE,
    SESSION_AUDIENCE,
};
use crate::common::{safe_token_log, ApiError};

/// Lifetime of an authenticated session
pub const SESSION_TTL_DAYS: i64 = 30;
/// Lifetime of a pending registration
pub const REGISTRATION_TTL_HOURS: i64 = 1;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed signing token: {0}")]
    Signing(String),

    #[error("invalid or expired token: {0}")]
    Invalid(String),

    #[error("token claims do not match the expected kind")]
    WrongShape,
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => ApiError::InternalServer(msg),
            TokenError::Invalid(_) | TokenError::WrongShape => {
                ApiError::AuthError("Invalid or expired token.".to_string())
            }
        }
    }
}

/// Signs claim sets and verifies tokens for an expected audience
pub trait TokenSigner: Send + Sync {
    fn sign(&self, claims: &Value) -> Result<String, TokenError>;

    /// Checks signature, expiry and audience, returning the raw claims
    fn verify(&self, token: &str, audience: &str) -> Result<Value, TokenError>;
}

/// HMAC-SHA256 JWT signer
pub struct HmacSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl HmacSigner {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

impl TokenSigner for HmacSigner {
    fn sign(&self, claims: &Value) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    fn verify(&self, token: &str, audience: &str) -> Result<Value, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[audience]);
        validation.leeway = 0;

        decode::<Value>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }
}

pub struct SessionTokenService {
    signer: Arc<dyn TokenSigner>,
}

impl SessionTokenService {
    pub fn new(signer: Arc<dyn TokenSigner>) -> Self {
        Self { signer }
    }

    pub fn from_secret(secret: &str) -> Self {
        Self::new(Arc::new(HmacSigner::new(secret)))
    }

    /// Issues a 30 day session token for a registered user
    pub fn issue_session(&self, user_id: &str, username: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: user_id.to_string(),
            username: username.to_string(),
            aud: SESSION_AUDIENCE.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::days(SESSION_TTL_DAYS)).timestamp(),
        };

        debug!(user_id = %user_id, "Issuing session token");
        self.sign(&claims)
    }

    /// Issues a 1 hour token describing an OAuth identity with no account yet
    pub fn issue_pending_registration(
        &self,
        provider_name: &str,
        provider_id: &str,
        avatar_url: &str,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = RegistrationClaims {
            provider_name: provider_name.to_string(),
            provider_id: provider_id.to_string(),
            avatar_url: avatar_url.to_string(),
            aud: REGISTRATION_AUDIENCE.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(REGISTRATION_TTL_HOURS)).timestamp(),
        };

        debug!(provider = %provider_name, "Issuing pending registration token");
        self.sign(&claims)
    }

    /// Checks signature, expiry and the audience of `kind`, then parses the
    /// claim shape of that kind
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<VerifiedClaims, TokenError> {
        let value = self.signer.verify(token, kind.audience()).map_err(|e| {
            warn!(token = %safe_token_log(token), audience = %kind.audience(), error = %e, "Token rejected");
            e
        })?;

        let claims = match kind {
            TokenKind::Session => serde_json::from_value(value).map(VerifiedClaims::Session),
            TokenKind::Registration => {
                serde_json::from_value(value).map(VerifiedClaims::Registration)
            }
        };
        claims.map_err(|_| TokenError::WrongShape)
    }

    pub fn verify_session(&self, token: &str) -> Result<SessionClaims, TokenError> {
        match self.verify(token, TokenKind::Session)? {
            VerifiedClaims::Session(claims) => Ok(claims),
            VerifiedClaims::Registration(_) => Err(TokenError::WrongShape),
        }
    }

    pub fn verify_registration(&self, token: &str) -> Result<RegistrationClaims, TokenError> {
        match self.verify(token, TokenKind::Registration)? {
            VerifiedClaims::Registration(claims) => Ok(claims),
            VerifiedClaims::Session(_) => Err(TokenError::WrongShape),
        }
    }

    fn sign<C: Serialize>(&self, claims: &C) -> Result<String, TokenError> {
        let value =
            serde_json::to_value(claims).map_err(|e| TokenError::Signing(e.to_string()))?;
        self.signer.sign(&value)
    }
}
