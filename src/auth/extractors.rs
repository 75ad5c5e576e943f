//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::models::User;
use crate::common::cookies::{read_cookie, SESSION_COOKIE};
use crate::common::{safe_token_log, ApiError, AppState};
use crate::storage::UserStore;

/// Requires a valid session of an existing user
#[derive(Debug, Clone)]
pub struct AuthedUser(pub User);

/// Optional session. No credential, or a session of a deleted user, is anonymous.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybeUser(user) = MaybeUser::from_request_parts(parts, state).await?;

        match user {
            Some(user) => Ok(AuthedUser(user)),
            None => Err(ApiError::Unauthenticated(
                "You must be logged in.".to_string(),
            )),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(app_state): Extension<Arc<AppState>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let token = match session_token(parts)? {
            Some(token) => token,
            None => return Ok(MaybeUser(None)),
        };

        let claims = app_state.tokens.verify_session(&token).map_err(|e| {
            warn!(token = %safe_token_log(&token), error = %e, "Session token rejected");
            ApiError::Unauthenticated("Invalid or expired session.".to_string())
        })?;

        let user = app_state.store.find_user_by_id(&claims.sub).await?;
        if user.is_none() {
            debug!(user_id = %claims.sub, "Session belongs to a deleted user, treating as anonymous");
        }

        Ok(MaybeUser(user))
    }
}

/// The session cookie wins. Without one, an `Authorization` header must use
/// the Bearer scheme.
fn session_token(parts: &Parts) -> Result<Option<String>, ApiError> {
    if let Some(token) = read_cookie(&parts.headers, SESSION_COOKIE) {
        return Ok(Some(token));
    }

    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = header
        .to_str()
        .map_err(|_| ApiError::BadRequest("Malformed Authorization header.".to_string()))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(Some(token.trim().to_string())),
        _ => Err(ApiError::BadRequest(
            "Authorization header must use the Bearer scheme.".to_string(),
        )),
    }
}
