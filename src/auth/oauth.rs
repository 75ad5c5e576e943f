// src/auth/oauth.rs
//! OAuth2 authorization-code flow against the registered providers

use chrono::Duration;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::models::{CallbackQuery, ProviderUser};
use super::providers::{ProviderMappingError, ProviderRegistry};
use crate::common::helpers::now_millis;
use crate::common::{generate_raw_id, ApiError};
use crate::services::{ProviderClient, ProviderClientError};
use crate::storage::{OAuthState, OAuthStateStore};

/// Lifetime of a login attempt, and of its browser cookie
pub const OAUTH_STATE_TTL_MINUTES: i64 = 10;

const STATE_LENGTH: usize = 32;
const SESSION_ID_LENGTH: usize = 32;

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("unknown provider '{0}'")]
    UnknownProvider(String),

    #[error("login session cookie is missing")]
    MissingSession,

    #[error("login state not found or expired")]
    StateNotFound,

    #[error("login was started with provider '{0}'")]
    ProviderMismatch(String),

    #[error("state mismatch")]
    StateMismatch,

    #[error("provider refused the login: {0}")]
    ProviderDenied(String),

    #[error("callback is missing the '{0}' parameter")]
    MissingParameter(&'static str),

    #[error("provider request failed: {0}")]
    Client(#[from] ProviderClientError),

    #[error("unexpected provider user info: {0}")]
    Mapping(#[from] ProviderMappingError),
}

impl From<OAuthError> for ApiError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::UnknownProvider(_) => ApiError::NotFound(err.to_string()),
            OAuthError::Client(_) | OAuthError::Mapping(_) => ApiError::Upstream(err.to_string()),
            _ => ApiError::AuthError(err.to_string()),
        }
    }
}

/// Redirect target and browser session of a freshly started login
#[derive(Debug, Clone)]
pub struct LoginStart {
    pub redirect_url: String,
    pub session_id: String,
}

pub struct OAuthFlowController {
    registry: Arc<ProviderRegistry>,
    client: Arc<dyn ProviderClient>,
    states: Arc<dyn OAuthStateStore>,
}

impl OAuthFlowController {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        client: Arc<dyn ProviderClient>,
        states: Arc<dyn OAuthStateStore>,
    ) -> Self {
        Self {
            registry,
            client,
            states,
        }
    }

    /// Stores a fresh state under a new browser session and returns the
    /// provider's authorization URL
    pub async fn begin_login(&self, provider_key: &str) -> Result<LoginStart, ApiError> {
        let provider = self
            .registry
            .get(provider_key)
            .ok_or_else(|| OAuthError::UnknownProvider(provider_key.to_string()))?;

        let state = generate_raw_id(STATE_LENGTH);
        let session_id = generate_raw_id(SESSION_ID_LENGTH);

        self.states
            .save_state(
                &session_id,
                &OAuthState {
                    state: state.clone(),
                    provider: provider.key.clone(),
                    expires_at: now_millis() + Duration::minutes(OAUTH_STATE_TTL_MINUTES),
                },
            )
            .await?;

        info!(provider = %provider.key, "OAuth login started");

        Ok(LoginStart {
            redirect_url: provider.authorization_url(&state),
            session_id,
        })
    }

    /// Validates the callback against the stored state, then exchanges the
    /// code and fetches the provider user.
    ///
    /// The stored state is consumed whatever the outcome. No provider endpoint
    /// is contacted unless the state checks pass.
    pub async fn handle_callback(
        &self,
        provider_key: &str,
        session_id: Option<&str>,
        query: &CallbackQuery,
    ) -> Result<(ProviderUser, String), ApiError> {
        let provider = self
            .registry
            .get(provider_key)
            .ok_or_else(|| OAuthError::UnknownProvider(provider_key.to_string()))?;

        let session_id = session_id.ok_or(OAuthError::MissingSession)?;

        let stored = self
            .states
            .take_state(session_id)
            .await?
            .filter(|s| s.expires_at > now_millis())
            .ok_or(OAuthError::StateNotFound)?;

        if stored.provider != provider.key {
            warn!(expected = %stored.provider, got = %provider.key, "OAuth callback for a different provider");
            return Err(OAuthError::ProviderMismatch(stored.provider).into());
        }

        if let Some(error) = &query.error {
            return Err(OAuthError::ProviderDenied(error.clone()).into());
        }

        let state = query
            .state
            .as_deref()
            .ok_or(OAuthError::MissingParameter("state"))?;
        if state != stored.state {
            warn!(provider = %provider.key, "OAuth state mismatch");
            return Err(OAuthError::StateMismatch.into());
        }

        let code = query
            .code
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(OAuthError::MissingParameter("code"))?;

        let access_token = self
            .client
            .exchange_code(provider, code)
            .await
            .map_err(OAuthError::from)?;
        let info = self
            .client
            .fetch_user(provider, &access_token)
            .await
            .map_err(OAuthError::from)?;
        let user = provider.map_user(&info).map_err(OAuthError::from)?;

        info!(provider = %provider.key, provider_id = %user.id, "OAuth callback completed");

        Ok((user, provider.name.clone()))
    }
}
