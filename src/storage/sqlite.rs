// src/storage/sqlite.rs
//! SQLite implementation of the storage traits

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

use super::{OAuthState, OAuthStateStore, PasteStore, UserStore};
use crate::auth::models::User;
use crate::common::helpers::from_millis;
use crate::common::migrations::run_migrations;
use crate::common::ApiError;
use crate::pastes::models::{ExpiresIn, Paste, Pasty};

#[derive(FromRow)]
struct UserRow {
    id: String,
    created_at: i64,
    username: String,
    avatar_url: String,
    provider_name: String,
    provider_id: String,
    contributor: bool,
    supporter: i64,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            created_at: from_millis(row.created_at),
            username: row.username,
            avatar_url: row.avatar_url,
            provider_name: row.provider_name,
            provider_id: row.provider_id,
            contributor: row.contributor,
            supporter: u32::try_from(row.supporter).unwrap_or(0),
        }
    }
}

#[derive(FromRow)]
struct PasteRow {
    id: String,
    created_at: i64,
    title: String,
    expires_in: String,
    deletes_at: Option<i64>,
    owner_id: Option<String>,
    private: bool,
}

#[derive(FromRow)]
struct PastyRow {
    id: String,
    title: String,
    content: String,
    language: String,
}

const USER_COLUMNS: &str =
    "id, created_at, username, avatar_url, provider_name, provider_id, contributor, supporter";

const PASTE_COLUMNS: &str = "id, created_at, title, expires_in, deletes_at, owner_id, private";

#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if missing) the database at `database_url` and runs migrations
    pub async fn connect(
        database_url: &str,
        acquire_timeout: Duration,
    ) -> Result<Self, sqlx::Error> {
        if let Some(path_part) = database_url.strip_prefix("sqlite://") {
            let path_without_params = path_part.split('?').next().unwrap_or("");
            if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
                let db_path = PathBuf::from(path_without_params);
                if let Some(parent) = db_path.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .acquire_timeout(acquire_timeout)
            .connect_with(connect_options)
            .await?;

        run_migrations(&pool).await?;
        info!(database_url = %database_url, "Database ready");

        Ok(Self::new(pool))
    }

    /// Private in-memory database with the full schema, used by tests
    #[cfg(test)]
    pub async fn in_memory() -> Self {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        Self::new(pool)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load_pasties(&self, paste_id: &str) -> Result<Vec<Pasty>, ApiError> {
        let rows = sqlx::query_as::<_, PastyRow>(
            "SELECT id, title, content, language FROM pasties WHERE paste_id = ? ORDER BY position ASC",
        )
        .bind(paste_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, paste_id = %paste_id, "Failed loading pasties of a paste");
            ApiError::DatabaseError(e)
        })?;

        Ok(rows
            .into_iter()
            .map(|row| Pasty {
                id: row.id,
                title: row.title,
                content: row.content,
                language: row.language,
            })
            .collect())
    }

    async fn into_paste(&self, row: PasteRow) -> Result<Paste, ApiError> {
        let pasties = self.load_pasties(&row.id).await?;
        let expires_in = ExpiresIn::from_str(&row.expires_in).map_err(|e| {
            ApiError::InternalServer(format!("paste {} has a corrupt expiry: {}", row.id, e))
        })?;

        Ok(Paste {
            id: row.id,
            created_at: from_millis(row.created_at),
            expires_in,
            deletes_at: row.deletes_at.map(from_millis),
            title: row.title,
            owner_id: row.owner_id,
            private: row.private,
            pasties,
        })
    }
}

#[async_trait]
impl UserStore for SqliteStore {
    async fn user_exists_by_id(&self, id: &str) -> Result<bool, ApiError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn user_exists_by_username(&self, username: &str) -> Result<bool, ApiError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = ?)")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = ?",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_provider(
        &self,
        provider_name: &str,
        provider_id: &str,
    ) -> Result<Option<User>, ApiError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE provider_name = ? AND provider_id = ?",
            USER_COLUMNS
        ))
        .bind(provider_name)
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(row.map(User::from))
    }

    async fn insert_user(&self, user: &User) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, created_at, username, avatar_url, provider_name, provider_id,
                contributor, supporter
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(user.created_at.timestamp_millis())
        .bind(&user.username)
        .bind(&user.avatar_url)
        .bind(&user.provider_name)
        .bind(&user.provider_id)
        .bind(user.contributor)
        .bind(i64::from(user.supporter))
        .execute(&self.pool)
        .await
        .map_err(|e| ApiError::from_write(e, "Username or account is already taken."))?;

        debug!(user_id = %user.id, "Inserted user");
        Ok(())
    }

    async fn set_username(&self, id: &str, username: &str) -> Result<(), ApiError> {
        let result = sqlx::query("UPDATE users SET username = ? WHERE id = ?")
            .bind(username)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ApiError::from_write(e, "Username is taken."))?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found());
        }
        Ok(())
    }
}

#[async_trait]
impl PasteStore for SqliteStore {
    async fn paste_exists(&self, id: &str) -> Result<bool, ApiError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM pastes WHERE id = ?)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)
    }

    async fn insert_paste(&self, paste: &Paste) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::DatabaseError)?;

        sqlx::query(
            r#"
            INSERT INTO pastes (id, created_at, title, expires_in, deletes_at, owner_id, private)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&paste.id)
        .bind(paste.created_at.timestamp_millis())
        .bind(&paste.title)
        .bind(paste.expires_in.as_str())
        .bind(paste.deletes_at.map(|d| d.timestamp_millis()))
        .bind(paste.owner_id.as_deref())
        .bind(paste.private)
        .execute(&mut *tx)
        .await
        .map_err(|e| ApiError::from_write(e, "Paste id is already taken."))?;

        for (position, pasty) in paste.pasties.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO pasties (paste_id, id, position, title, content, language)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&paste.id)
            .bind(&pasty.id)
            .bind(position as i64)
            .bind(&pasty.title)
            .bind(&pasty.content)
            .bind(&pasty.language)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, paste_id = %paste.id, "Failed inserting a pasty, rolling back paste");
                ApiError::DatabaseError(e)
            })?;
        }

        tx.commit().await.map_err(ApiError::DatabaseError)?;
        Ok(())
    }

    async fn find_paste(&self, id: &str) -> Result<Option<Paste>, ApiError> {
        let row = sqlx::query_as::<_, PasteRow>(&format!(
            "SELECT {} FROM pastes WHERE id = ?",
            PASTE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::DatabaseError)?;

        match row {
            Some(row) => Ok(Some(self.into_paste(row).await?)),
            None => Ok(None),
        }
    }

    async fn delete_paste(&self, id: &str) -> Result<bool, ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::DatabaseError)?;

        sqlx::query("DELETE FROM pasties WHERE paste_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::DatabaseError)?;

        let result = sqlx::query("DELETE FROM pastes WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::DatabaseError)?;

        tx.commit().await.map_err(ApiError::DatabaseError)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_pastes_by_owner(
        &self,
        owner_id: &str,
        include_private: bool,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Paste>, ApiError> {
        let rows = sqlx::query_as::<_, PasteRow>(&format!(
            r#"
            SELECT {} FROM pastes
            WHERE owner_id = ? AND (? OR private = 0)
            ORDER BY created_at DESC, id ASC
            LIMIT ? OFFSET ?
            "#,
            PASTE_COLUMNS
        ))
        .bind(owner_id)
        .bind(include_private)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::DatabaseError)?;

        let mut pastes = Vec::with_capacity(rows.len());
        for row in rows {
            pastes.push(self.into_paste(row).await?);
        }
        Ok(pastes)
    }

    async fn count_pastes_by_owner(
        &self,
        owner_id: &str,
        include_private: bool,
    ) -> Result<u64, ApiError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pastes WHERE owner_id = ? AND (? OR private = 0)",
        )
        .bind(owner_id)
        .bind(include_private)
        .fetch_one(&self.pool)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn count_pastes(&self) -> Result<u64, ApiError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM pastes")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn delete_expired_pastes(&self, now: DateTime<Utc>) -> Result<u64, ApiError> {
        let now = now.timestamp_millis();
        let mut tx = self.pool.begin().await.map_err(ApiError::DatabaseError)?;

        sqlx::query(
            r#"
            DELETE FROM pasties WHERE paste_id IN (
                SELECT id FROM pastes WHERE deletes_at IS NOT NULL AND deletes_at <= ?
            )
            "#,
        )
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::DatabaseError)?;

        let result =
            sqlx::query("DELETE FROM pastes WHERE deletes_at IS NOT NULL AND deletes_at <= ?")
                .bind(now)
                .execute(&mut *tx)
                .await
                .map_err(ApiError::DatabaseError)?;

        tx.commit().await.map_err(ApiError::DatabaseError)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl OAuthStateStore for SqliteStore {
    async fn save_state(&self, session_id: &str, state: &OAuthState) -> Result<(), ApiError> {
        sqlx::query(
            r#"
            INSERT INTO oauth_states (session_id, state, provider, expires_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(session_id) DO UPDATE SET
                state = excluded.state,
                provider = excluded.provider,
                expires_at = excluded.expires_at
            "#,
        )
        .bind(session_id)
        .bind(&state.state)
        .bind(&state.provider)
        .bind(state.expires_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(())
    }

    /// Read and delete in one statement, so two callbacks racing on the same
    /// session can never both see the state
    async fn take_state(&self, session_id: &str) -> Result<Option<OAuthState>, ApiError> {
        let row = sqlx::query_as::<_, (String, String, i64)>(
            "DELETE FROM oauth_states WHERE session_id = ? RETURNING state, provider, expires_at",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::DatabaseError)?;

        Ok(row.map(|(state, provider, expires_at)| OAuthState {
            state,
            provider,
            expires_at: from_millis(expires_at),
        }))
    }

    async fn delete_expired_states(&self, now: DateTime<Utc>) -> Result<u64, ApiError> {
        let result = sqlx::query("DELETE FROM oauth_states WHERE expires_at <= ?")
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(ApiError::DatabaseError)?;

        Ok(result.rows_affected())
    }
}
