//! Authentication data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audience of authenticated-session tokens
pub const SESSION_AUDIENCE: &str = "session";
/// Audience of pending-registration tokens
pub const REGISTRATION_AUDIENCE: &str = "registration";

/// JWT claims of an authenticated session
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    pub username: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// JWT claims of a pending registration (OAuth login of an unknown identity)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RegistrationClaims {
    pub provider_name: String,
    pub provider_id: String,
    pub avatar_url: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Which of the two token shapes a caller expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Session,
    Registration,
}

impl TokenKind {
    pub fn audience(&self) -> &'static str {
        match self {
            TokenKind::Session => SESSION_AUDIENCE,
            TokenKind::Registration => REGISTRATION_AUDIENCE,
        }
    }
}

/// Claims of a verified token, tagged by kind
#[derive(Debug, Clone, PartialEq)]
pub enum VerifiedClaims {
    Session(SessionClaims),
    Registration(RegistrationClaims),
}

/// User database model
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub username: String,
    pub avatar_url: String,
    #[serde(skip_serializing)]
    pub provider_name: String,
    #[serde(skip_serializing)]
    pub provider_id: String,
    pub contributor: bool,
    pub supporter: u32,
}

/// Identity returned by an OAuth provider, normalized across providers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderUser {
    pub id: String,
    pub username: String,
    pub avatar_url: String,
}

/// POST /api/v3/auth/register body
#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
}

/// PATCH /api/v3/settings/username body
#[derive(Deserialize, Debug)]
pub struct SetUsernameRequest {
    pub username: String,
}

/// Query of the OAuth callback redirect
#[derive(Deserialize, Debug)]
pub struct CallbackQuery {
    pub state: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
}
