//! # Pastes Module
//!
//! Paste lifecycle:
//! - Creation with validation, language resolution and unique ids
//! - Reads and deletes with owner based access control
//! - Paginated listing of a user's pastes
//! - Content statistics
//! - Background sweeping of expired pastes

pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod stats;
pub mod sweeper;
pub mod validators;


pub use routes::pastes_routes;
pub use services::PasteLifecycleManager;
pub use sweeper::ExpirySweeper;
