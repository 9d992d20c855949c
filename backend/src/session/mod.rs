//! Stateless session tokens: HS256-signed compact JWS.
//!
//! The header is always `{"alg":"HS256","typ":"JWT"}` and the signature is
//! `HMAC-SHA256(secret, base64url(header) "." base64url(payload))`. Tokens are
//! only trusted after the signature has been checked against the configured secret,
//! then the issuance window is validated with a small clock skew allowance.
//!
//! The codec is generic over the payload so the short-lived OAuth challenge cookie
//! uses the same signing path as the session cookie.

pub mod error;
mod types;


use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{de::DeserializeOwned, Serialize};
use sha2::Sha256;

pub use error::SessionError;
pub use types::{JwsHeader, JwsTokenParts, SessionToken, TimeBound, ALG_HS256, TYP_JWT};
pub(crate) use types::max_age_secs;

use crate::types::AuthConfig;

type HmacSha256 = Hmac<Sha256>;

/// Allowed clock drift when validating `iat` and `exp`
pub const CLOCK_SKEW_SECS: i64 = 60;

/// Signs and verifies session tokens with the process-wide secret
#[derive(Clone)]
pub struct SessionCodec {
    key: Vec<u8>,
    max_age: Duration,
}

impl SessionCodec {
    #[must_use]
    pub fn new(secret: &str, max_age: Duration) -> Self {
        Self {
            key: secret.as_bytes().to_vec(),
            max_age,
        }
    }

    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.session_secret(), config.session_max_age)
    }

    #[must_use]
    pub const fn max_age(&self) -> Duration {
        self.max_age
    }

    /// A fresh, claim-less session token issued now
    #[must_use]
    pub fn new_session(&self) -> SessionToken {
        SessionToken::new(Utc::now().timestamp(), self.max_age, random_hex(16))
    }

    /// Re-issues `token` now with a full lifetime
    #[must_use]
    pub fn refresh(&self, token: SessionToken) -> SessionToken {
        token.refreshed(Utc::now().timestamp(), self.max_age)
    }

    /// Encodes `claims` as a signed compact JWS.
    ///
    /// # Errors
    /// Returns `SessionError::Encoding` if the claims cannot be serialized
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, SessionError> {
        let signing_input = craft_signing_input(&JwsHeader::default(), claims)?;
        let signature = sign(&self.key, &signing_input)?;
        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    /// Decodes and verifies a token at the current time.
    ///
    /// # Errors
    /// - `SessionError::InvalidToken` - malformed token or unexpected header
    /// - `SessionError::InvalidSignature` - signed with another secret or tampered
    /// - `SessionError::Expired` / `SessionError::IssuedInFuture` - outside its window
    pub fn decode<T>(&self, token: &str) -> Result<T, SessionError>
    where
        T: DeserializeOwned + TimeBound,
    {
        self.decode_at(token, Utc::now().timestamp())
    }

    /// Same as [`Self::decode`] with an explicit clock.
    ///
    /// # Errors
    /// See [`Self::decode`]
    pub fn decode_at<T>(&self, token: &str, now: i64) -> Result<T, SessionError>
    where
        T: DeserializeOwned + TimeBound,
    {
        let parts = JwsTokenParts::<T>::try_from(token)?;
        validate_header(&parts.header)?;
        verify_signature(&parts, &self.key)?;
        validate_claims(&parts.payload, now, CLOCK_SKEW_SECS)?;
        Ok(parts.payload)
    }
}

fn validate_header(header: &JwsHeader) -> Result<(), SessionError> {
    if header.alg != ALG_HS256 || header.typ != TYP_JWT {
        return Err(SessionError::InvalidToken);
    }
    Ok(())
}

pub(crate) fn craft_signing_input<T: Serialize>(
    header: &JwsHeader,
    payload: &T,
) -> Result<String, SessionError> {
    let header_json =
        serde_json::to_vec(header).map_err(|e| SessionError::Encoding(e.to_string()))?;
    let payload_json =
        serde_json::to_vec(payload).map_err(|e| SessionError::Encoding(e.to_string()))?;

    Ok(format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header_json),
        URL_SAFE_NO_PAD.encode(payload_json)
    ))
}

fn sign(key: &[u8], signing_input: &str) -> Result<Vec<u8>, SessionError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| SessionError::Encoding(e.to_string()))?;
    mac.update(signing_input.as_bytes());
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Constant-time check of the HMAC over the signing input
pub(crate) fn verify_signature<T>(parts: &JwsTokenParts<T>, key: &[u8]) -> Result<(), SessionError> {
    let signature = URL_SAFE_NO_PAD
        .decode(&parts.signature)
        .map_err(|_| SessionError::InvalidToken)?;

    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| SessionError::InvalidSignature)?;
    mac.update(parts.signing_input.as_bytes());
    mac.verify_slice(&signature)
        .map_err(|_| SessionError::InvalidSignature)
}

/// Validates the issuance window of already-verified claims
pub(crate) fn validate_claims<T: TimeBound>(
    claims: &T,
    now: i64,
    skew: i64,
) -> Result<(), SessionError> {
    if now >= claims.expires_at().saturating_add(skew) {
        return Err(SessionError::Expired);
    }
    if claims.issued_at() > now.saturating_add(skew) {
        return Err(SessionError::IssuedInFuture);
    }
    Ok(())
}

/// Random lowercase hex string of `len` bytes of entropy
#[must_use]
pub fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
