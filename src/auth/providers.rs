// src/auth/providers.rs
//! OAuth provider configuration and registry

use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{info, warn};

use super::models::ProviderUser;
use crate::common::config::{AppConfig, ProviderCredentials};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProviderMappingError {
    #[error("user info is missing field '{0}'")]
    MissingField(String),

    #[error("user info field '{0}' has an unexpected type")]
    InvalidField(String),
}

/// How the access token is presented to the user-info endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: token <access token>` (GitHub)
    Token,
    /// `Authorization: Bearer <access token>`
    Bearer,
}

impl AuthScheme {
    pub fn header_value(&self, access_token: &str) -> String {
        match self {
            AuthScheme::Token => format!("token {}", access_token),
            AuthScheme::Bearer => format!("Bearer {}", access_token),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Lowercase key used in routes, e.g. `github`
    pub key: String,
    /// Display name stored on users, e.g. `GitHub`
    pub name: String,
    pub auth_url: String,
    pub token_url: String,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
    pub scopes: Vec<String>,
    pub user_url: String,
    pub id_field: String,
    pub username_field: String,
    pub avatar_field: String,
    pub auth_scheme: AuthScheme,
    pub accept: Option<String>,
    /// GitHub and GitLab return numeric ids
    pub numeric_id: bool,
}

impl ProviderConfig {
    pub fn github(credentials: &ProviderCredentials, api_host: &str) -> Self {
        Self {
            key: "github".to_string(),
            name: "GitHub".to_string(),
            auth_url: "https://github.com/login/oauth/authorize".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            redirect_url: callback_url(api_host, "github"),
            scopes: vec!["read:user".to_string()],
            user_url: "https://api.github.com/user".to_string(),
            id_field: "id".to_string(),
            username_field: "login".to_string(),
            avatar_field: "avatar_url".to_string(),
            auth_scheme: AuthScheme::Token,
            accept: Some("application/vnd.github.v3+json".to_string()),
            numeric_id: true,
        }
    }

    pub fn gitlab(credentials: &ProviderCredentials, api_host: &str) -> Self {
        Self {
            key: "gitlab".to_string(),
            name: "GitLab".to_string(),
            auth_url: "https://gitlab.com/oauth/authorize".to_string(),
            token_url: "https://gitlab.com/oauth/token".to_string(),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            redirect_url: callback_url(api_host, "gitlab"),
            scopes: vec!["read_user".to_string()],
            user_url: "https://gitlab.com/api/v4/user".to_string(),
            id_field: "id".to_string(),
            username_field: "username".to_string(),
            avatar_field: "avatar_url".to_string(),
            auth_scheme: AuthScheme::Bearer,
            accept: None,
            numeric_id: true,
        }
    }

    pub fn google(credentials: &ProviderCredentials, api_host: &str) -> Self {
        Self {
            key: "google".to_string(),
            name: "Google".to_string(),
            auth_url: "https://accounts.google.com/o/oauth2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            redirect_url: callback_url(api_host, "google"),
            scopes: vec!["https://www.googleapis.com/auth/userinfo.profile".to_string()],
            user_url: "https://www.googleapis.com/oauth2/v1/userinfo?alt=json".to_string(),
            id_field: "id".to_string(),
            username_field: "name".to_string(),
            avatar_field: "picture".to_string(),
            auth_scheme: AuthScheme::Bearer,
            accept: None,
            numeric_id: false,
        }
    }

    /// Authorization endpoint URL the browser is redirected to
    pub fn authorization_url(&self, state: &str) -> String {
        let scope = self.scopes.join(" ");
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
            ("response_type", "code"),
            ("scope", scope.as_str()),
            ("state", state),
        ];

        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");

        let separator = if self.auth_url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", self.auth_url, separator, query)
    }

    /// Normalizes the user-info JSON using the configured field names.
    ///
    /// Numeric ids are read as floats and rendered as integers, so `12345`
    /// and `12345.0` both become `"12345"`.
    pub fn map_user(&self, info: &Value) -> Result<ProviderUser, ProviderMappingError> {
        let raw_id = info
            .get(&self.id_field)
            .filter(|v| !v.is_null())
            .ok_or_else(|| ProviderMappingError::MissingField(self.id_field.clone()))?;

        let id = if self.numeric_id {
            let number = raw_id
                .as_f64()
                .ok_or_else(|| ProviderMappingError::InvalidField(self.id_field.clone()))?;
            format!("{}", number as i64)
        } else {
            match raw_id {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return Err(ProviderMappingError::InvalidField(self.id_field.clone())),
            }
        };

        let username = info
            .get(&self.username_field)
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderMappingError::MissingField(self.username_field.clone()))?
            .to_string();

        let avatar_url = info
            .get(&self.avatar_field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Ok(ProviderUser {
            id,
            username,
            avatar_url,
        })
    }
}

fn callback_url(api_host: &str, key: &str) -> String {
    format!("{}/api/v3/auth/callback/{}", api_host.trim_end_matches('/'), key)
}

/// Immutable set of configured providers, keyed by route key
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, ProviderConfig>,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<ProviderConfig>) -> Self {
        Self {
            providers: providers
                .into_iter()
                .map(|p| (p.key.clone(), p))
                .collect(),
        }
    }

    /// Registers every provider that has credentials in the config
    pub fn from_config(config: &AppConfig) -> Self {
        let mut providers = Vec::new();

        if let Some(credentials) = &config.github {
            providers.push(ProviderConfig::github(credentials, &config.api_host));
        }
        if let Some(credentials) = &config.gitlab {
            providers.push(ProviderConfig::gitlab(credentials, &config.api_host));
        }
        if let Some(credentials) = &config.google {
            providers.push(ProviderConfig::google(credentials, &config.api_host));
        }

        let registry = Self::new(providers);
        if registry.providers.is_empty() {
            warn!("No OAuth providers configured, logins are disabled");
        } else {
            info!(providers = ?registry.keys(), "OAuth providers registered");
        }

        registry
    }

    pub fn get(&self, key: &str) -> Option<&ProviderConfig> {
        self.providers.get(key)
    }

    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
