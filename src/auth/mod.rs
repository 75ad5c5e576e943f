//! # Auth Module
//!
//! This module handles login and identity:
//! - OAuth2 logins against GitHub, GitLab and Google
//! - Two-phase registration of first-time identities
//! - Session and pending-registration JWTs
//! - AuthedUser / MaybeUser extractors for handlers

pub mod extractors;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod providers;
pub mod registrar;
pub mod routes;
pub mod tokens;
pub mod validators;


pub use extractors::{AuthedUser, MaybeUser};
pub use models::User;
pub use routes::auth_routes;
