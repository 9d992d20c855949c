//! Browser-side half of the World ID login.
//!
//! [`SignInTrigger`] starts the login: it fetches a CSRF token, asks the auth
//! service for the provider's authorize URL and hands that URL to a
//! [`Navigator`]. [`SessionClient`] talks to the auth service directly and can
//! also read the current session.

mod client;
mod error;
mod navigator;
mod trigger;

pub use client::{SessionClient, DEFAULT_BASE_PATH};
pub use error::ClientError;
pub use navigator::{Navigator, TracingNavigator};
pub use trigger::{SignInTrigger, PROVIDER_ID};
