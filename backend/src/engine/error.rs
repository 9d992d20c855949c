//! Errors raised by the auth engine while handling a delegated request

use thiserror::Error;

use crate::identity::ProfileError;
use crate::session::SessionError;

/// Error code for a provider that redirected back with `access_denied`
pub const ACCESS_DENIED: &str = "AccessDenied";
/// Error code for any other rejected OAuth callback
pub const OAUTH_CALLBACK: &str = "OAuthCallback";

/// Failures raised while handling a request. Rejected OAuth callbacks are turned
/// into a redirect to the error action by the engine; everything else escapes and
/// becomes the 500 JSON envelope. Client mistakes (bad CSRF token, unknown action)
/// are answered by the engine itself and never surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The provider redirected back with an OAuth error instead of a code
    #[error("Provider returned error: {0}")]
    ProviderDenied(String),

    /// The provider answered a back-channel call with a non-success status
    #[error("Provider {endpoint} request failed with status {status}")]
    ProviderStatus { endpoint: &'static str, status: u16 },

    /// Network failure talking to the provider
    #[error("Provider request failed: {0}")]
    ProviderNetwork(#[from] reqwest::Error),

    #[error("Invalid identity profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("OAuth callback is missing the authorization code")]
    MissingCode,

    #[error("OAuth challenge cookie is missing")]
    MissingChallenge,

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("Session token error: {0}")]
    Session(#[from] SessionError),

    #[error("Failed to build provider request: {0}")]
    InvalidProviderUrl(#[from] url::ParseError),

    #[error("Failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Error page code when this failure comes from the browser's return from the
    /// provider rather than from the service itself
    #[must_use]
    pub fn callback_error_code(&self) -> Option<&'static str> {
        match self {
            Self::ProviderDenied(error) if error == "access_denied" => Some(ACCESS_DENIED),
            Self::ProviderDenied(_)
            | Self::MissingCode
            | Self::MissingChallenge
            | Self::StateMismatch => Some(OAUTH_CALLBACK),
            Self::Session(err) if !matches!(err, SessionError::Encoding(_)) => {
                Some(OAUTH_CALLBACK)
            }
            _ => None,
        }
    }
}
