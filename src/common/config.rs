// src/common/config.rs
//! Application configuration loaded from environment variables

use std::env;
use std::time::Duration;

/// OAuth client credentials for a single provider
#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    /// Public base URL of this API, used to build OAuth redirect URIs
    pub api_host: String,
    /// Base URL of the web client users get redirected to after login
    pub client_url: String,
    /// Marks credential cookies as `Secure`
    pub https: bool,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    pub github: Option<ProviderCredentials>,
    pub gitlab: Option<ProviderCredentials>,
    pub google: Option<ProviderCredentials>,
    pub sweep_interval: Duration,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://pastemyst.db".to_string(),
            port: 5000,
            api_host: "http://localhost:5000".to_string(),
            client_url: "http://localhost:5173".to_string(),
            https: false,
            jwt_secret: "replace_with_strong_secret".to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            github: None,
            gitlab: None,
            google: None,
            sweep_interval: Duration::from_secs(5),
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = env::var("DATABASE_URL") {
            config.database_url = url;
        }

        if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
            config.port = port;
        }

        if let Ok(host) = env::var("API_HOST") {
            config.api_host = host.trim_end_matches('/').to_string();
        }

        if let Ok(url) = env::var("CLIENT_URL") {
            config.client_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(https) = env::var("HTTPS") {
            config.https = https.to_lowercase() == "true";
        }

        if let Ok(secret) = env::var("JWT_SECRET") {
            config.jwt_secret = secret;
        }

        if let Ok(origins) = env::var("CORS_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect();
        }

        config.github = provider_from_env("GITHUB");
        config.gitlab = provider_from_env("GITLAB");
        config.google = provider_from_env("GOOGLE");

        if let Some(secs) = env::var("SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
        {
            config.sweep_interval = Duration::from_secs(secs);
        }

        if let Some(secs) = env::var("HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|s| *s > 0)
        {
            config.http_timeout = Duration::from_secs(secs);
        }

        config
    }
}

/// Reads `<PREFIX>_CLIENT_ID` / `<PREFIX>_CLIENT_SECRET`.
/// A provider without a client id is left unconfigured.
fn provider_from_env(prefix: &str) -> Option<ProviderCredentials> {
    let client_id = env::var(format!("{}_CLIENT_ID", prefix))
        .ok()
        .filter(|id| !id.is_empty())?;
    let client_secret = env::var(format!("{}_CLIENT_SECRET", prefix)).unwrap_or_default();

    Some(ProviderCredentials {
        client_id,
        client_secret,
    })
}
