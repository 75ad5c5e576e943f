// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod auth;
mod common;
mod logging_middleware;
mod pastes;
mod services;
mod storage;
mod users;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use common::{AppConfig, AppState};
use pastes::ExpirySweeper;
use services::{HttpProviderClient, LanguageCatalog};
use storage::SqliteStore;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = AppConfig::from_env();
    info!(
        api_host = %config.api_host,
        client_url = %config.client_url,
        https = config.https,
        "Configuration loaded"
    );

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    let store = SqliteStore::connect(&config.database_url, Duration::from_secs(5)).await?;

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let provider_client = Arc::new(HttpProviderClient::new(config.http_timeout)?);
    let languages = Arc::new(LanguageCatalog::new());
    info!(languages = languages.len(), "Language catalog loaded");

    let port = config.port;
    let sweep_interval = config.sweep_interval;
    let state = Arc::new(AppState::new(config, store, provider_client, languages));

    ExpirySweeper::new(state.store.clone(), state.store.clone(), sweep_interval).spawn();
    info!(interval_secs = sweep_interval.as_secs(), "Expiry sweeper started");

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

// ============================================================================
// ROUTER COMPOSITION
// ============================================================================

pub fn build_router(state: Arc<AppState>) -> Router {
    let origins = cors_origins(&state.config.cors_origins);

    Router::new()
        .merge(auth::auth_routes())
        .merge(pastes::pastes_routes())
        .merge(users::users_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_request))
        .layer(Extension(state))
        .layer(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::DELETE,
                    axum::http::Method::PATCH,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                    axum::http::HeaderName::from_static(logging_middleware::REQUEST_ID_HEADER),
                ])
                .allow_credentials(true),
        )
        .layer(TraceLayer::new_for_http())
}

/// Credentialed CORS cannot use a wildcard, so `*` entries are dropped
fn cors_origins(configured: &[String]) -> Vec<axum::http::HeaderValue> {
    configured
        .iter()
        .filter(|origin| {
            if origin.trim() == "*" {
                warn!("Ignoring wildcard CORS origin, credentials require explicit origins");
                return false;
            }
            true
        })
        .filter_map(|origin| origin.parse().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_origins_drop_wildcard() {
        let origins = cors_origins(&["*".to_string(), "http://localhost:5173".to_string()]);
        assert_eq!(origins, vec!["http://localhost:5173"]);
    }

    #[tokio::test]
    async fn test_router_builds_with_wildcard_origin() {
        let config = AppConfig {
            cors_origins: vec!["*".to_string()],
            ..Default::default()
        };
        let state = AppState::new(
            config,
            SqliteStore::in_memory().await,
            Arc::new(HttpProviderClient::new(Duration::from_secs(1)).unwrap()),
            Arc::new(LanguageCatalog::new()),
        );
        build_router(Arc::new(state));
    }
}
