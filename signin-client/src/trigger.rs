use url::Url;

use crate::{client::SessionClient, error::ClientError, navigator::Navigator};

/// Provider id of World ID on the auth service
pub const PROVIDER_ID: &str = "worldcoin";

/// The "Sign in with World ID" action
pub struct SignInTrigger<N> {
    client: SessionClient,
    navigator: N,
    callback_url: Option<String>,
}

impl<N: Navigator> SignInTrigger<N> {
    pub const fn new(client: SessionClient, navigator: N) -> Self {
        Self {
            client,
            navigator,
            callback_url: None,
        }
    }

    /// Where the user lands after login; defaults to the site origin
    #[must_use]
    pub fn with_callback_url(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = Some(callback_url.into());
        self
    }

    /// Starts the login. Failures are logged and swallowed.
    pub async fn activate(&self) {
        if let Err(e) = self.try_activate().await {
            tracing::error!("Sign in error: {e}");
        }
    }

    /// Starts the login and returns the URL handed to the navigator
    ///
    /// # Errors
    ///
    /// Returns a `ClientError` if the auth service cannot be reached or refuses the sign-in
    pub async fn try_activate(&self) -> Result<Url, ClientError> {
        let callback_url = self
            .callback_url
            .clone()
            .unwrap_or_else(|| self.client.site_origin());

        let url = self.client.sign_in(PROVIDER_ID, &callback_url).await?;
        self.navigator.navigate(&url);
        Ok(url)
    }
}
