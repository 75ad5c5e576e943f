//! User profile and settings handlers

use axum::extract::{Extension, Json, Path, Query};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::models::{SetUsernameRequest, User};
use crate::auth::{AuthedUser, MaybeUser};
use crate::common::{ApiError, AppState};
use crate::pastes::models::{Page, PageQuery, Paste};
use crate::storage::UserStore;

#[derive(Debug, Deserialize)]
pub struct UserIdQuery {
    pub id: Option<String>,
}

/// GET /api/v3/user/:username
pub async fn get_user_by_username(
    Extension(state): Extension<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .store
        .find_user_by_username(&username)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(user))
}

/// GET /api/v3/user?id=
pub async fn get_user_by_id(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<UserIdQuery>,
) -> Result<Json<User>, ApiError> {
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(ApiError::not_found)?;

    let user = state
        .store
        .find_user_by_id(&id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(user))
}

/// GET /api/v3/user/:username/pastes?page=0&page_size=15
pub async fn get_user_pastes(
    Extension(state): Extension<Arc<AppState>>,
    MaybeUser(caller): MaybeUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<Paste>>, ApiError> {
    let page = state
        .pastes
        .list_for_owner(&username, caller.as_ref(), &query)
        .await?;

    Ok(Json(page))
}

/// PATCH /api/v3/settings/username
pub async fn set_username(
    Extension(state): Extension<Arc<AppState>>,
    AuthedUser(user): AuthedUser,
    Json(payload): Json<SetUsernameRequest>,
) -> Result<Json<User>, ApiError> {
    let user = state
        .registrar
        .change_username(&user, payload.username.trim())
        .await?;

    Ok(Json(user))
}
