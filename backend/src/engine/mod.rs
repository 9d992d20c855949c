//! Auth engine: the OIDC flow behind the entry point.
//!
//! The entry point only knows the [`AuthEngine`] seam. [`WorldIdEngine`] is the
//! single implementation and serves these actions relative to the base path:
//!
//! - `GET providers` - configured provider and its URLs
//! - `GET csrf` - double-submit CSRF token
//! - `GET session` - session view, refreshing the session cookie
//! - `POST signin/worldcoin` - authorize URL with state, nonce and PKCE
//! - `GET callback/worldcoin` - code exchange, userinfo, session issuance
//! - `POST signout` - drops the session cookie
//! - `GET error` - echoes the error code

mod challenge;
pub mod cookies;
mod csrf;
pub mod error;
mod provider;
mod request;
mod world_id;

pub use challenge::{Challenge, CHALLENGE_MAX_AGE};
pub use error::EngineError;
pub use provider::{TokenResponse, WorldIdProvider};
pub use request::{AuthAction, EngineRequest, EngineResponse};
pub use world_id::{WorldIdEngine, PROVIDER_ID, PROVIDER_NAME};

/// Handles one delegated auth request
#[async_trait::async_trait]
pub trait AuthEngine: Send + Sync {
    async fn handle(&self, request: EngineRequest) -> Result<EngineResponse, EngineError>;
}
