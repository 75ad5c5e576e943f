//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /api/v3/auth/login/:provider` - Start an OAuth login
/// - `GET /api/v3/auth/callback/:provider` - OAuth redirect target
/// - `POST /api/v3/auth/register` - Finish a pending registration
/// - `GET /api/v3/auth/self` - Current user
/// - `POST /api/v3/auth/logout` - Clear the session cookie
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/v3/auth/login/:provider", get(handlers::login))
        .route("/api/v3/auth/callback/:provider", get(handlers::callback))
        .route("/api/v3/auth/register", post(handlers::register))
        .route("/api/v3/auth/self", get(handlers::get_self))
        .route("/api/v3/auth/logout", post(handlers::logout))
}
