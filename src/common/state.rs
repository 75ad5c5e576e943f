// Application state shared across all modules

use std::sync::Arc;

use super::config::AppConfig;
use crate::auth::oauth::OAuthFlowController;
use crate::auth::providers::ProviderRegistry;
use crate::auth::registrar::AccountRegistrar;
use crate::auth::tokens::SessionTokenService;
use crate::pastes::services::PasteLifecycleManager;
use crate::services::{LanguageResolver, ProviderClient};
use crate::storage::SqliteStore;

/// Read-only application state, shared as `Extension<Arc<AppState>>`
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<SqliteStore>,
    pub tokens: Arc<SessionTokenService>,
    pub oauth: Arc<OAuthFlowController>,
    pub registrar: Arc<AccountRegistrar>,
    pub pastes: Arc<PasteLifecycleManager>,
}

impl AppState {
    /// Wires the services on top of one store
    pub fn new(
        config: AppConfig,
        store: SqliteStore,
        provider_client: Arc<dyn ProviderClient>,
        languages: Arc<dyn LanguageResolver>,
    ) -> Self {
        let store = Arc::new(store);
        let registry = Arc::new(ProviderRegistry::from_config(&config));
        let tokens = Arc::new(SessionTokenService::from_secret(&config.jwt_secret));

        let oauth = Arc::new(OAuthFlowController::new(
            registry,
            provider_client,
            store.clone(),
        ));
        let registrar = Arc::new(AccountRegistrar::new(store.clone(), tokens.clone()));
        let pastes = Arc::new(PasteLifecycleManager::new(
            store.clone(),
            store.clone(),
            languages,
        ));

        Self {
            config: Arc::new(config),
            store,
            tokens,
            oauth,
            registrar,
            pastes,
        }
    }
}
