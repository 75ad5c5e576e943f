//! # Storage Module
//!
//! Persistence collaborators used by the auth and paste services.
//! The traits keep the services independent of the database; `SqliteStore`
//! is the implementation wired up in `main`.

pub mod sqlite;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::auth::models::User;
use crate::common::ApiError;
use crate::pastes::models::Paste;

pub use sqlite::SqliteStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user_exists_by_id(&self, id: &str) -> Result<bool, ApiError>;

    async fn user_exists_by_username(&self, username: &str) -> Result<bool, ApiError>;

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, ApiError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    async fn find_user_by_provider(
        &self,
        provider_name: &str,
        provider_id: &str,
    ) -> Result<Option<User>, ApiError>;

    /// Fails with `Conflict` when the username or provider identity is taken.
    async fn insert_user(&self, user: &User) -> Result<(), ApiError>;

    /// Fails with `Conflict` when the username is taken.
    async fn set_username(&self, id: &str, username: &str) -> Result<(), ApiError>;
}

#[async_trait]
pub trait PasteStore: Send + Sync {
    async fn paste_exists(&self, id: &str) -> Result<bool, ApiError>;

    /// Inserts the paste and all of its pasties atomically.
    async fn insert_paste(&self, paste: &Paste) -> Result<(), ApiError>;

    async fn find_paste(&self, id: &str) -> Result<Option<Paste>, ApiError>;

    /// Returns whether a paste was deleted.
    async fn delete_paste(&self, id: &str) -> Result<bool, ApiError>;

    /// Owner's pastes, newest first.
    async fn list_pastes_by_owner(
        &self,
        owner_id: &str,
        include_private: bool,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Paste>, ApiError>;

    async fn count_pastes_by_owner(
        &self,
        owner_id: &str,
        include_private: bool,
    ) -> Result<u64, ApiError>;

    /// Number of stored pastes, private ones included
    async fn count_pastes(&self) -> Result<u64, ApiError>;

    /// Deletes every paste whose deletion time is set and not after `now`.
    async fn delete_expired_pastes(&self, now: DateTime<Utc>) -> Result<u64, ApiError>;
}

/// State issued at the start of an OAuth login, bound to one browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthState {
    pub state: String,
    pub provider: String,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait OAuthStateStore: Send + Sync {
    async fn save_state(&self, session_id: &str, state: &OAuthState) -> Result<(), ApiError>;

    /// Removes and returns the state of `session_id`, so it can be used only once.
    async fn take_state(&self, session_id: &str) -> Result<Option<OAuthState>, ApiError>;

    async fn delete_expired_states(&self, now: DateTime<Utc>) -> Result<u64, ApiError>;
}
