//! Session token error types

use thiserror::Error;

/// Errors that can occur while encoding or decoding session tokens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The token is not a well-formed HS256 JWS
    #[error("Malformed session token")]
    InvalidToken,

    /// The signature does not match the configured secret
    #[error("Invalid session token signature")]
    InvalidSignature,

    /// The token is past its expiry
    #[error("Session token expired")]
    Expired,

    /// The token claims to be issued in the future
    #[error("Session token issued in the future")]
    IssuedInFuture,

    /// Claims could not be serialized or the signing key rejected
    #[error("Failed to encode session token: {0}")]
    Encoding(String),
}
