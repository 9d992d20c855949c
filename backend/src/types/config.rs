//! Process-wide auth configuration, built once at startup and shared read-only

use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use super::Environment;
use crate::engine::cookies::CookiePolicy;

/// Fallback site URL for local front-end development
pub const DEFAULT_SITE_URL: &str = "http://localhost:5173";

/// Default mount point of the auth entry point
pub const DEFAULT_BASE_PATH: &str = "/api/auth";

/// World ID OIDC issuer
pub const DEFAULT_WORLD_ID_ISSUER: &str = "https://id.worldcoin.org";

/// Sessions live for 30 days from issuance
pub const SESSION_MAX_AGE: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Upper bound for one delegated auth request, provider round trips included
pub const ENGINE_TIMEOUT: Duration = Duration::from_secs(10);

/// Secrets shorter than this are accepted but reported
const RECOMMENDED_SECRET_LEN: usize = 32;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Credentials and endpoints of the World ID OIDC provider
#[derive(Clone)]
pub struct ProviderConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Issuer base URL; authorize, token and userinfo endpoints hang off it
    pub issuer: Url,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("issuer", &self.issuer.as_str())
            .finish()
    }
}

impl ProviderConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `issuer` is not an absolute URL
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        issuer: &str,
    ) -> Result<Self, ConfigError> {
        let issuer = Url::parse(issuer).map_err(|e| ConfigError::InvalidValue {
            name: "WORLD_ID_ISSUER_URL",
            reason: e.to_string(),
        })?;

        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            issuer,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.issuer.as_str().trim_end_matches('/'))
    }

    #[must_use]
    pub fn authorization_endpoint(&self) -> String {
        self.endpoint("authorize")
    }

    #[must_use]
    pub fn token_endpoint(&self) -> String {
        self.endpoint("token")
    }

    #[must_use]
    pub fn userinfo_endpoint(&self) -> String {
        self.endpoint("userinfo")
    }
}

/// Single owned configuration object for the session service
#[derive(Clone)]
pub struct AuthConfig {
    pub environment: Environment,
    /// Public URL of the front end; default redirect target after login
    pub site_url: Url,
    /// Serialized origin of `site_url`, used as the CORS allow-origin value
    pub site_origin: String,
    /// Path the auth entry point is mounted on, without trailing slash
    pub base_path: String,
    pub provider: ProviderConfig,
    session_secret: String,
    pub session_max_age: Duration,
    pub engine_timeout: Duration,
    pub cookies: CookiePolicy,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("environment", &self.environment)
            .field("site_url", &self.site_url.as_str())
            .field("base_path", &self.base_path)
            .field("provider", &self.provider)
            .field("session_secret", &"<redacted>")
            .field("session_max_age", &self.session_max_age)
            .field("engine_timeout", &self.engine_timeout)
            .finish_non_exhaustive()
    }
}

impl AuthConfig {
    /// Builds a configuration from explicit values.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the site URL cannot be parsed or the secret is empty
    pub fn new(
        environment: Environment,
        site_url: &str,
        provider: ProviderConfig,
        session_secret: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let site_url = Url::parse(site_url).map_err(|e| ConfigError::InvalidValue {
            name: "SITE_URL",
            reason: e.to_string(),
        })?;
        if !site_url.origin().is_tuple() {
            return Err(ConfigError::InvalidValue {
                name: "SITE_URL",
                reason: "must be an http(s) URL".to_string(),
            });
        }

        let session_secret = session_secret.into();
        if session_secret.is_empty() {
            return Err(ConfigError::Missing("AUTH_SECRET"));
        }
        if session_secret.len() < RECOMMENDED_SECRET_LEN {
            tracing::warn!(
                "AUTH_SECRET is shorter than {RECOMMENDED_SECRET_LEN} bytes, consider a longer secret"
            );
        }

        Ok(Self {
            environment,
            site_origin: site_url.origin().ascii_serialization(),
            site_url,
            base_path: DEFAULT_BASE_PATH.to_string(),
            provider,
            session_secret,
            session_max_age: SESSION_MAX_AGE,
            engine_timeout: ENGINE_TIMEOUT,
            cookies: CookiePolicy::default(),
        })
    }

    /// Loads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a required variable is missing or a value is invalid
    pub fn from_env(environment: Environment) -> Result<Self, ConfigError> {
        let site_url = env::var("SITE_URL").unwrap_or_else(|_| DEFAULT_SITE_URL.to_string());
        let issuer =
            env::var("WORLD_ID_ISSUER_URL").unwrap_or_else(|_| DEFAULT_WORLD_ID_ISSUER.to_string());

        let provider = ProviderConfig::new(
            required("WORLD_ID_CLIENT_ID")?,
            required("WORLD_ID_CLIENT_SECRET")?,
            &issuer,
        )?;

        let config = Self::new(environment, &site_url, provider, required("AUTH_SECRET")?)?;

        match env::var("AUTH_BASE_PATH") {
            Ok(base_path) => config.with_base_path(&base_path),
            Err(_) => Ok(config),
        }
    }

    /// Overrides the mount point of the entry point. `/` mounts it at the root,
    /// stored as the empty path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the path is not absolute
    pub fn with_base_path(mut self, base_path: &str) -> Result<Self, ConfigError> {
        let base_path = base_path.trim();
        if !base_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                name: "AUTH_BASE_PATH",
                reason: format!("{base_path} must start with /"),
            });
        }
        self.base_path = base_path.trim_end_matches('/').to_string();
        Ok(self)
    }

    #[must_use]
    pub fn session_secret(&self) -> &str {
        &self.session_secret
    }

    /// Absolute URL of an auth action, e.g. `callback/worldcoin`
    #[must_use]
    pub fn action_url(&self, action: &str) -> String {
        format!("{}{}/{action}", self.site_origin, self.base_path)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}
