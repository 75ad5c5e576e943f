// src/auth/registrar.rs
//! Login outcome decisions and the two-phase account registration

use std::sync::Arc;
use tracing::{info, warn};

use super::models::{ProviderUser, User};
use super::tokens::SessionTokenService;
use super::validators::UsernameValidator;
use crate::common::helpers::now_millis;
use crate::common::{generate_unique_id, ApiError, Validator};
use crate::storage::UserStore;

/// Result of a successful OAuth callback
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// Known identity, logged in right away
    Session { token: String, user: User },
    /// First login of this identity, the client must pick a username
    PendingRegistration {
        token: String,
        suggested_username: String,
    },
}

pub struct AccountRegistrar {
    users: Arc<dyn UserStore>,
    tokens: Arc<SessionTokenService>,
}

impl AccountRegistrar {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<SessionTokenService>) -> Self {
        Self { users, tokens }
    }

    pub async fn resolve_login(
        &self,
        provider_name: &str,
        provider_user: &ProviderUser,
    ) -> Result<LoginOutcome, ApiError> {
        if let Some(user) = self
            .users
            .find_user_by_provider(provider_name, &provider_user.id)
            .await?
        {
            let token = self.tokens.issue_session(&user.id, &user.username)?;
            info!(user_id = %user.id, provider = %provider_name, "Existing user logged in");
            return Ok(LoginOutcome::Session { token, user });
        }

        let token = self.tokens.issue_pending_registration(
            provider_name,
            &provider_user.id,
            &provider_user.avatar_url,
        )?;
        info!(provider = %provider_name, provider_id = %provider_user.id, "New identity, registration pending");

        Ok(LoginOutcome::PendingRegistration {
            token,
            suggested_username: provider_user.username.clone(),
        })
    }

    /// Creates the account described by a pending-registration token
    pub async fn complete(
        &self,
        pending_token: &str,
        username: &str,
    ) -> Result<(User, String), ApiError> {
        let claims = self.tokens.verify_registration(pending_token).map_err(|_| {
            ApiError::AuthError("Invalid or expired registration token.".to_string())
        })?;

        let username = username.to_string();
        UsernameValidator.validate(&username).into_result()?;

        if self.users.user_exists_by_username(&username).await? {
            return Err(ApiError::Conflict("Username is already taken.".to_string()));
        }

        if self
            .users
            .find_user_by_provider(&claims.provider_name, &claims.provider_id)
            .await?
            .is_some()
        {
            warn!(provider = %claims.provider_name, provider_id = %claims.provider_id, "Registration for an identity that is already linked");
            return Err(ApiError::Conflict(
                "This account is already linked.".to_string(),
            ));
        }

        let users = self.users.clone();
        let id = generate_unique_id(|candidate| {
            let users = users.clone();
            async move { users.user_exists_by_id(&candidate).await }
        })
        .await?;

        let user = User {
            id,
            created_at: now_millis(),
            username,
            avatar_url: claims.avatar_url,
            provider_name: claims.provider_name,
            provider_id: claims.provider_id,
            contributor: false,
            supporter: 0,
        };
        self.users.insert_user(&user).await?;

        let token = self.tokens.issue_session(&user.id, &user.username)?;
        info!(user_id = %user.id, username = %user.username, "User registered");

        Ok((user, token))
    }

    /// Renames `user`; keeping the current name is a no-op
    pub async fn change_username(&self, user: &User, new_username: &str) -> Result<User, ApiError> {
        if user.username == new_username {
            return Ok(user.clone());
        }

        let new_username = new_username.to_string();
        UsernameValidator.validate(&new_username).into_result()?;

        if self.users.user_exists_by_username(&new_username).await? {
            return Err(ApiError::Conflict("Username is already taken.".to_string()));
        }

        self.users.set_username(&user.id, &new_username).await?;
        info!(user_id = %user.id, from = %user.username, to = %new_username, "Username changed");

        Ok(User {
            username: new_username,
            ..user.clone()
        })
    }
}
