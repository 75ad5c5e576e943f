//! Paste handlers

use axum::{
    extract::{Extension, Json, Path},
    http::StatusCode,
};
use std::sync::Arc;

use super::models::{ActivePastes, LangStat, Paste, PasteCreateInfo, PasteStats};
use crate::auth::MaybeUser;
use crate::common::{ApiError, AppState};

/// POST /api/v3/paste
///
/// # Request Body
/// ```json
/// {
///   "title": "notes",
///   "expiresIn": "1d",
///   "private": false,
///   "anonymous": false,
///   "pasties": [{ "title": "main.rs", "content": "fn main() {}", "language": "rust" }]
/// }
/// ```
pub async fn create_paste(
    Extension(state): Extension<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Json(payload): Json<PasteCreateInfo>,
) -> Result<Json<Paste>, ApiError> {
    let paste = state.pastes.create(&payload, user.as_ref()).await?;
    Ok(Json(paste))
}

/// GET /api/v3/paste/:id
pub async fn get_paste(
    Extension(state): Extension<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<Paste>, ApiError> {
    let paste = state.pastes.get(&id, user.as_ref()).await?;
    Ok(Json(paste))
}

/// DELETE /api/v3/paste/:id
pub async fn delete_paste(
    Extension(state): Extension<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.pastes.delete(&id, user.as_ref()).await?;
    Ok(StatusCode::OK)
}

/// GET /api/v3/paste/:id/stats
pub async fn get_paste_stats(
    Extension(state): Extension<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<PasteStats>, ApiError> {
    let stats = state.pastes.stats(&id, user.as_ref()).await?;
    Ok(Json(stats))
}

/// GET /api/v3/paste/:id/langs
pub async fn get_paste_lang_stats(
    Extension(state): Extension<Arc<AppState>>,
    MaybeUser(user): MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<LangStat>>, ApiError> {
    let stats = state.pastes.lang_stats(&id, user.as_ref()).await?;
    Ok(Json(stats))
}

/// GET /api/v3/meta/activePastes
pub async fn get_active_pastes(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<ActivePastes>, ApiError> {
    let count = state.pastes.active_count().await?;
    Ok(Json(ActivePastes { count }))
}
