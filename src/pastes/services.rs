// src/pastes/services.rs
//! Paste creation, access control, deletion and listing

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::models::{
    ExpiresIn, LangStat, Page, PageQuery, Paste, PasteCreateInfo, PasteStats, Pasty,
    FALLBACK_LANGUAGE,
};
use super::stats::{lang_stats, paste_stats};
use super::validators::PasteCreateValidator;
use crate::auth::models::User;
use crate::common::helpers::now_millis;
use crate::common::{generate_unique_id, generate_unique_id_sync, ApiError, Validator};
use crate::services::LanguageResolver;
use crate::storage::{PasteStore, UserStore};

pub const DEFAULT_PAGE_SIZE: u64 = 15;
pub const MAX_PAGE_SIZE: u64 = 100;

pub struct PasteLifecycleManager {
    pastes: Arc<dyn PasteStore>,
    users: Arc<dyn UserStore>,
    languages: Arc<dyn LanguageResolver>,
}

impl PasteLifecycleManager {
    pub fn new(
        pastes: Arc<dyn PasteStore>,
        users: Arc<dyn UserStore>,
        languages: Arc<dyn LanguageResolver>,
    ) -> Self {
        Self {
            pastes,
            users,
            languages,
        }
    }

    pub async fn create(
        &self,
        create_info: &PasteCreateInfo,
        caller: Option<&User>,
    ) -> Result<Paste, ApiError> {
        if create_info.private && caller.is_none() {
            return Err(ApiError::AuthError(
                "You must be logged in to create a private paste.".to_string(),
            ));
        }

        PasteCreateValidator.validate(create_info).into_result()?;
        let expires_in = ExpiresIn::from_str(&create_info.expires_in)
            .map_err(ApiError::ValidationError)?;

        let owner_id = if create_info.anonymous {
            None
        } else {
            caller.map(|user| user.id.clone())
        };

        let mut taken = HashSet::with_capacity(create_info.pasties.len());
        let mut pasties = Vec::with_capacity(create_info.pasties.len());
        for pasty in &create_info.pasties {
            let id = generate_unique_id_sync(|candidate| taken.contains(candidate))?;
            taken.insert(id.clone());

            pasties.push(Pasty {
                id,
                title: pasty.title.clone(),
                content: pasty.content.clone(),
                language: self
                    .languages
                    .resolve(&pasty.language)
                    .unwrap_or_else(|| FALLBACK_LANGUAGE.to_string()),
            });
        }

        let store = self.pastes.clone();
        let id = generate_unique_id(|candidate| {
            let store = store.clone();
            async move { store.paste_exists(&candidate).await }
        })
        .await?;

        let created_at = now_millis();
        let paste = Paste {
            id,
            created_at,
            expires_in,
            deletes_at: expires_in.deletes_at(created_at),
            title: create_info.title.clone(),
            owner_id,
            private: create_info.private,
            pasties,
        };

        self.pastes.insert_paste(&paste).await?;

        info!(
            paste_id = %paste.id,
            owner_id = ?paste.owner_id,
            pasties = paste.pasties.len(),
            expires_in = %paste.expires_in,
            "Paste created"
        );

        Ok(paste)
    }

    /// A missing paste and someone else's private paste both give `NotFound`
    pub async fn get(&self, paste_id: &str, caller: Option<&User>) -> Result<Paste, ApiError> {
        let paste = self
            .pastes
            .find_paste(paste_id)
            .await?
            .ok_or_else(ApiError::not_found)?;

        if paste.private && !is_owner(&paste, caller) {
            debug!(paste_id = %paste_id, "Private paste requested by someone else");
            return Err(ApiError::not_found());
        }

        Ok(paste)
    }

    pub async fn delete(&self, paste_id: &str, caller: Option<&User>) -> Result<(), ApiError> {
        let caller = caller.ok_or_else(|| {
            ApiError::Unauthenticated("You must be logged in to delete a paste.".to_string())
        })?;

        let paste = self
            .pastes
            .find_paste(paste_id)
            .await?
            .ok_or_else(ApiError::not_found)?;

        if paste.owner_id.is_none() {
            return Err(ApiError::not_found());
        }

        if !is_owner(&paste, Some(caller)) {
            if paste.private {
                return Err(ApiError::not_found());
            }
            warn!(paste_id = %paste_id, user_id = %caller.id, "Delete of someone else's paste refused");
            return Err(ApiError::Forbidden(
                "You can only delete your own pastes.".to_string(),
            ));
        }

        // The sweeper may have won the race
        if !self.pastes.delete_paste(paste_id).await? {
            return Err(ApiError::not_found());
        }

        info!(paste_id = %paste_id, user_id = %caller.id, "Paste deleted");
        Ok(())
    }

    /// Pastes of `username`, newest first. Private ones only for the owner.
    pub async fn list_for_owner(
        &self,
        username: &str,
        caller: Option<&User>,
        query: &PageQuery,
    ) -> Result<Page<Paste>, ApiError> {
        let owner = self
            .users
            .find_user_by_username(username)
            .await?
            .ok_or_else(ApiError::not_found)?;

        let include_private = caller.map(|c| c.id == owner.id).unwrap_or(false);
        let page_size = query
            .page_size
            .filter(|size| *size > 0)
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        let page = query.page.unwrap_or(0);

        let total = self
            .pastes
            .count_pastes_by_owner(&owner.id, include_private)
            .await?;
        let total_pages = total.div_ceil(page_size);

        let items = self
            .pastes
            .list_pastes_by_owner(
                &owner.id,
                include_private,
                page_size,
                page.saturating_mul(page_size),
            )
            .await?;

        Ok(Page {
            items,
            total_pages,
            page,
            page_size,
            has_next_page: page.saturating_add(1) < total_pages,
        })
    }

    pub async fn stats(
        &self,
        paste_id: &str,
        caller: Option<&User>,
    ) -> Result<PasteStats, ApiError> {
        let paste = self.get(paste_id, caller).await?;
        Ok(paste_stats(&paste))
    }

    /// Language shares of a paste, behind the same access control as `get`
    pub async fn lang_stats(
        &self,
        paste_id: &str,
        caller: Option<&User>,
    ) -> Result<Vec<LangStat>, ApiError> {
        let paste = self.get(paste_id, caller).await?;
        Ok(lang_stats(&paste))
    }

    /// Number of pastes currently stored
    pub async fn active_count(&self) -> Result<u64, ApiError> {
        self.pastes.count_pastes().await
    }
}

fn is_owner(paste: &Paste, caller: Option<&User>) -> bool {
    match (&paste.owner_id, caller) {
        (Some(owner_id), Some(user)) => *owner_id == user.id,
        _ => false,
    }
}
