//! Paste routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// # Routes
/// - `POST /api/v3/paste` - Create a paste
/// - `GET /api/v3/paste/:id` - Get a paste
/// - `DELETE /api/v3/paste/:id` - Delete an owned paste
/// - `GET /api/v3/paste/:id/stats` - Line, word and byte counts
/// - `GET /api/v3/paste/:id/langs` - Share of each language
/// - `GET /api/v3/meta/activePastes` - Number of stored pastes
pub fn pastes_routes() -> Router {
    Router::new()
        .route("/api/v3/paste", post(handlers::create_paste))
        .route(
            "/api/v3/paste/:id",
            get(handlers::get_paste).delete(handlers::delete_paste),
        )
        .route("/api/v3/paste/:id/stats", get(handlers::get_paste_stats))
        .route("/api/v3/paste/:id/langs", get(handlers::get_paste_lang_stats))
        .route("/api/v3/meta/activePastes", get(handlers::get_active_pastes))
}
