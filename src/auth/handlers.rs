//! Authentication handlers

use axum::{
    extract::{Extension, Json, Path, Query},
    http::{header::SET_COOKIE, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use super::extractors::MaybeUser;
use super::models::{CallbackQuery, RegisterRequest};
use super::oauth::OAUTH_STATE_TTL_MINUTES;
use super::registrar::LoginOutcome;
use super::tokens::{REGISTRATION_TTL_HOURS, SESSION_TTL_DAYS};
use crate::common::cookies::{
    build_cookie, expired_cookie, read_cookie, SameSite, OAUTH_SESSION_COOKIE,
    REGISTRATION_COOKIE, SESSION_COOKIE,
};
use crate::common::{ApiError, AppState};

const SESSION_MAX_AGE_SECS: i64 = SESSION_TTL_DAYS * 24 * 60 * 60;
const REGISTRATION_MAX_AGE_SECS: i64 = REGISTRATION_TTL_HOURS * 60 * 60;

/// GET /api/v3/auth/login/:provider
/// Redirects to the provider's authorization page
pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Path(provider): Path<String>,
) -> Result<Response, ApiError> {
    let start = state.oauth.begin_login(&provider).await?;

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        build_cookie(
            OAUTH_SESSION_COOKIE,
            &start.session_id,
            OAUTH_STATE_TTL_MINUTES * 60,
            SameSite::Lax,
            state.config.https,
        )?,
    );

    Ok((headers, Redirect::temporary(&start.redirect_url)).into_response())
}

/// GET /api/v3/auth/callback/:provider
///
/// Known identities get a session cookie and land on the client. New ones get
/// a registration cookie and land on the client's account creation page.
pub async fn callback(
    Extension(state): Extension<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
    request_headers: HeaderMap,
) -> Result<Response, ApiError> {
    let session_id = read_cookie(&request_headers, OAUTH_SESSION_COOKIE);

    let (provider_user, provider_name) = state
        .oauth
        .handle_callback(&provider, session_id.as_deref(), &query)
        .await?;

    let outcome = state
        .registrar
        .resolve_login(&provider_name, &provider_user)
        .await?;

    let secure = state.config.https;
    let mut headers = HeaderMap::new();
    headers.append(SET_COOKIE, expired_cookie(OAUTH_SESSION_COOKIE, secure)?);

    let target = match outcome {
        LoginOutcome::Session { token, user } => {
            headers.append(
                SET_COOKIE,
                build_cookie(
                    SESSION_COOKIE,
                    &token,
                    SESSION_MAX_AGE_SECS,
                    SameSite::Strict,
                    secure,
                )?,
            );
            debug!(user_id = %user.id, "Redirecting logged in user to client");
            state.config.client_url.clone()
        }
        LoginOutcome::PendingRegistration {
            token,
            suggested_username,
        } => {
            headers.append(
                SET_COOKIE,
                build_cookie(
                    REGISTRATION_COOKIE,
                    &token,
                    REGISTRATION_MAX_AGE_SECS,
                    SameSite::Strict,
                    secure,
                )?,
            );
            format!(
                "{}/create-account?username={}",
                state.config.client_url,
                urlencoding::encode(&suggested_username)
            )
        }
    };

    Ok((headers, Redirect::temporary(&target)).into_response())
}

/// POST /api/v3/auth/register
/// Creates the account for the pending registration in the cookie
///
/// # Request Body
/// ```json
/// { "username": "alice" }
/// ```
pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    request_headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    let pending = read_cookie(&request_headers, REGISTRATION_COOKIE).ok_or_else(|| {
        ApiError::AuthError("Invalid or expired registration token.".to_string())
    })?;

    let (user, token) = state
        .registrar
        .complete(&pending, payload.username.trim())
        .await?;

    let secure = state.config.https;
    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        build_cookie(
            SESSION_COOKIE,
            &token,
            SESSION_MAX_AGE_SECS,
            SameSite::Strict,
            secure,
        )?,
    );
    headers.append(SET_COOKIE, expired_cookie(REGISTRATION_COOKIE, secure)?);

    Ok((headers, Json(user)).into_response())
}

/// GET /api/v3/auth/self
/// A session cookie of a deleted user is expired on the way out
pub async fn get_self(
    Extension(state): Extension<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    request_headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(user) = user {
        return Ok(Json(user).into_response());
    }

    let unauthenticated = ApiError::Unauthenticated("You must be logged in.".to_string());
    if read_cookie(&request_headers, SESSION_COOKIE).is_none() {
        return Err(unauthenticated);
    }

    debug!("Expiring the session cookie of a deleted user");
    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        expired_cookie(SESSION_COOKIE, state.config.https)?,
    );

    Ok((headers, unauthenticated).into_response())
}

/// POST /api/v3/auth/logout
/// Always clears the session cookie, with or without a valid session
pub async fn logout(
    Extension(state): Extension<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
) -> Result<Response, ApiError> {
    if let Some(user) = &user {
        info!(user_id = %user.id, "User logged out");
    }

    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        expired_cookie(SESSION_COOKIE, state.config.https)?,
    );

    Ok((headers, Json(json!({ "message": "Logged out" }))).into_response())
}
