//! # Users Module
//!
//! Public user profiles, per-user paste listings and account settings.

pub mod handlers;
pub mod routes;

pub use routes::users_routes;
