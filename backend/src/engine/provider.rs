//! Back-channel client for the World ID OIDC provider

use std::time::Duration;

use reqwest::{header, Client};
use serde::Deserialize;
use url::Url;

use super::{challenge::Challenge, error::EngineError};
use crate::types::ProviderConfig;

/// Timeout for one provider request; the callback makes two of them within
/// `ENGINE_TIMEOUT`
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 4;

/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

/// Scopes requested at the authorize endpoint
const SCOPES: &str = "openid";

/// Token endpoint response (RFC 6749 §5.1)
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// HTTP client for the authorize, token and userinfo endpoints.
///
/// A single pooled `reqwest::Client` is shared by all requests.
#[derive(Debug, Clone)]
pub struct WorldIdProvider {
    config: ProviderConfig,
    http_client: Client,
}

impl WorldIdProvider {
    /// # Errors
    ///
    /// Returns `EngineError::ProviderNetwork` if the HTTP client cannot be built
    pub fn new(config: ProviderConfig) -> Result<Self, EngineError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .user_agent(format!("worldid-auth/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Authorize URL the browser is sent to, carrying state, nonce and the PKCE challenge
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidProviderUrl` if the configured issuer yields an invalid URL
    pub fn authorization_url(
        &self,
        redirect_uri: &str,
        challenge: &Challenge,
    ) -> Result<Url, EngineError> {
        let mut url = Url::parse(&self.config.authorization_endpoint())?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", SCOPES)
            .append_pair("state", &challenge.state)
            .append_pair("nonce", &challenge.nonce)
            .append_pair("code_challenge", &challenge.code_challenge())
            .append_pair("code_challenge_method", "S256");
        Ok(url)
    }

    /// Exchanges an authorization code for tokens (client secret via HTTP basic auth).
    ///
    /// # Errors
    ///
    /// - `EngineError::ProviderNetwork` - the request failed or the body is not a token response
    /// - `EngineError::ProviderStatus` - the provider rejected the exchange
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        code_verifier: &str,
    ) -> Result<TokenResponse, EngineError> {
        let response = self
            .http_client
            .post(self.config.token_endpoint())
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .header(header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("code_verifier", code_verifier),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(%status, body = %error_text, "World ID token exchange failed");
            return Err(EngineError::ProviderStatus {
                endpoint: "token",
                status: status.as_u16(),
            });
        }

        Ok(response.json::<TokenResponse>().await?)
    }

    /// Fetches the raw profile claims for an access token
    ///
    /// # Errors
    ///
    /// - `EngineError::ProviderNetwork` - the request failed or the body is not JSON
    /// - `EngineError::ProviderStatus` - the provider rejected the access token
    pub async fn userinfo(&self, access_token: &str) -> Result<serde_json::Value, EngineError> {
        let response = self
            .http_client
            .get(self.config.userinfo_endpoint())
            .bearer_auth(access_token)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, "World ID userinfo request failed");
            return Err(EngineError::ProviderStatus {
                endpoint: "userinfo",
                status: status.as_u16(),
            });
        }

        Ok(response.json::<serde_json::Value>().await?)
    }
}
