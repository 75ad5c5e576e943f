// src/services/mod.rs
//
// Shared services used by the auth and paste modules

pub mod languages;
pub mod provider_client;

// Re-export commonly used types for convenience
pub use languages::{LanguageCatalog, LanguageResolver};
pub use provider_client::{HttpProviderClient, ProviderClient, ProviderClientError};
