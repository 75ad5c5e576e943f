// src/services/provider_client.rs
//! HTTP client for OAuth provider token and user-info endpoints

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use crate::auth::providers::ProviderConfig;

#[derive(Debug, Error)]
pub enum ProviderClientError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("provider answered HTTP {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("token response carried no access token")]
    MissingAccessToken,

    #[error("failed decoding provider response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait ProviderClient: Send + Sync {
    /// Exchanges an authorization code for an access token
    async fn exchange_code(
        &self,
        provider: &ProviderConfig,
        code: &str,
    ) -> Result<String, ProviderClientError>;

    /// Raw user-info JSON for the owner of `access_token`
    async fn fetch_user(
        &self,
        provider: &ProviderConfig,
        access_token: &str,
    ) -> Result<Value, ProviderClientError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpProviderClient {
    client: Client,
}

impl HttpProviderClient {
    pub fn new(timeout: Duration) -> Result<Self, ProviderClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pastemyst-api/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ProviderClientError::RequestFailed(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn exchange_code(
        &self,
        provider: &ProviderConfig,
        code: &str,
    ) -> Result<String, ProviderClientError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", provider.redirect_url.as_str()),
            ("client_id", provider.client_id.as_str()),
            ("client_secret", provider.client_secret.as_str()),
        ];

        debug!(provider = %provider.key, "Exchanging authorization code for a token");

        let response = self
            .client
            .post(&provider.token_url)
            .header(header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| ProviderClientError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(provider = %provider.key, status = %status, "Token exchange failed");
            return Err(ProviderClientError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ProviderClientError::InvalidResponse(e.to_string()))?;

        // GitHub reports a bad code with 200 and an error field
        if let Some(err) = token.error {
            return Err(ProviderClientError::InvalidResponse(format!(
                "{}: {}",
                err,
                token.error_description.unwrap_or_default()
            )));
        }

        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(ProviderClientError::MissingAccessToken)
    }

    async fn fetch_user(
        &self,
        provider: &ProviderConfig,
        access_token: &str,
    ) -> Result<Value, ProviderClientError> {
        let mut request = self
            .client
            .get(&provider.user_url)
            .header(
                header::AUTHORIZATION,
                provider.auth_scheme.header_value(access_token),
            );
        if let Some(accept) = &provider.accept {
            request = request.header(header::ACCEPT, accept);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ProviderClientError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(provider = %provider.key, status = %status, "Fetching provider user failed");
            return Err(ProviderClientError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ProviderClientError::InvalidResponse(e.to_string()))
    }
}
