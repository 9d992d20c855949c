use std::time::Duration;

use common_types::{CsrfResponse, RedirectResponse, SessionView};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ClientError;

/// Mount point of the auth service on the site
pub const DEFAULT_BASE_PATH: &str = "/api/auth";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the auth service actions, keeping cookies between calls
#[derive(Debug, Clone)]
pub struct SessionClient {
    http_client: Client,
    site_url: Url,
    base_path: String,
}

impl SessionClient {
    /// # Errors
    ///
    /// - `ClientError::InvalidUrl` - `site_url` is not an absolute URL
    /// - `ClientError::Request` - the HTTP client cannot be built
    pub fn new(site_url: &str) -> Result<Self, ClientError> {
        let http_client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http_client,
            site_url: Url::parse(site_url)?,
            base_path: DEFAULT_BASE_PATH.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = base_path.trim_end_matches('/').to_string();
        self
    }

    /// Origin of the site, used as the default callback URL
    #[must_use]
    pub fn site_origin(&self) -> String {
        self.site_url.origin().ascii_serialization()
    }

    fn action_url(&self, action: &str) -> Result<Url, ClientError> {
        Ok(self.site_url.join(&format!("{}/{action}", self.base_path))?)
    }

    /// # Errors
    ///
    /// Returns a `ClientError` if the request fails or the service rejects it
    pub async fn csrf_token(&self) -> Result<String, ClientError> {
        let response = self.http_client.get(self.action_url("csrf")?).send().await?;
        let csrf: CsrfResponse = parse(response).await?;
        Ok(csrf.csrf_token)
    }

    /// Starts a provider sign-in and returns the authorize URL to navigate to
    ///
    /// # Errors
    ///
    /// Returns a `ClientError` if a request fails or the service rejects it
    pub async fn sign_in(&self, provider: &str, callback_url: &str) -> Result<Url, ClientError> {
        let csrf_token = self.csrf_token().await?;

        let response = self
            .http_client
            .post(self.action_url(&format!("signin/{provider}"))?)
            .form(&[
                ("csrfToken", csrf_token.as_str()),
                ("callbackUrl", callback_url),
                ("json", "true"),
            ])
            .send()
            .await?;

        let redirect: RedirectResponse = parse(response).await?;
        Ok(Url::parse(&redirect.url)?)
    }

    /// # Errors
    ///
    /// Returns a `ClientError` if the request fails or the service rejects it
    pub async fn session(&self) -> Result<SessionView, ClientError> {
        let response = self
            .http_client
            .get(self.action_url("session")?)
            .send()
            .await?;
        parse(response).await
    }

    /// Ends the session and returns the URL to navigate to afterwards
    ///
    /// # Errors
    ///
    /// Returns a `ClientError` if a request fails or the service rejects it
    pub async fn sign_out(&self, callback_url: &str) -> Result<Url, ClientError> {
        let csrf_token = self.csrf_token().await?;

        let response = self
            .http_client
            .post(self.action_url("signout")?)
            .form(&[
                ("csrfToken", csrf_token.as_str()),
                ("callbackUrl", callback_url),
                ("json", "true"),
            ])
            .send()
            .await?;

        let redirect: RedirectResponse = parse(response).await?;
        Ok(Url::parse(&redirect.url)?)
    }
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json::<T>().await?)
}
