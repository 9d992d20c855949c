//! World ID session issuance service

#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

/// Auth engine: actions, cookies, CSRF and the World ID provider
pub mod engine;

/// Identity profile mapping and session callbacks
pub mod identity;

/// HTTP routes
pub mod routes;

/// Server startup
pub mod server;

/// Signed session tokens
pub mod session;

/// Configuration and environment
pub mod types;
