//! User routes

use axum::{
    routing::{get, patch},
    Router,
};

use super::handlers;

/// # Routes
/// - `GET /api/v3/user/:username` - Public profile
/// - `GET /api/v3/user?id=` - Public profile by id
/// - `GET /api/v3/user/:username/pastes` - Paginated pastes of a user
/// - `PATCH /api/v3/settings/username` - Rename the current user
pub fn users_routes() -> Router {
    Router::new()
        .route("/api/v3/user", get(handlers::get_user_by_id))
        .route("/api/v3/user/:username", get(handlers::get_user_by_username))
        .route("/api/v3/user/:username/pastes", get(handlers::get_user_pastes))
        .route("/api/v3/settings/username", patch(handlers::set_username))
}
