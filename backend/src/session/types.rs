use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use common_types::VerificationLevel;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::error::SessionError;

pub const ALG_HS256: &str = "HS256";
pub const TYP_JWT: &str = "JWT";

/// Protected JWS header. Unknown fields are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JwsHeader {
    pub alg: String,
    pub typ: String,
}

impl Default for JwsHeader {
    fn default() -> Self {
        Self {
            alg: ALG_HS256.to_string(),
            typ: TYP_JWT.to_string(),
        }
    }
}

/// Claims that carry an issuance window
pub trait TimeBound {
    /// Unix seconds
    fn issued_at(&self) -> i64;
    /// Unix seconds
    fn expires_at(&self) -> i64;
}

/// Claims of the session cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    /// Provider subject of the signed-in account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// World ID subject, set by the identity callbacks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worldcoin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_type: Option<VerificationLevel>,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
    pub jti: String,
}

impl SessionToken {
    /// Empty token valid from `now` for `max_age`
    #[must_use]
    pub fn new(now: i64, max_age: Duration, jti: String) -> Self {
        Self {
            sub: None,
            name: None,
            email: None,
            picture: None,
            worldcoin_id: None,
            verification_type: None,
            issued_at: now,
            expires_at: now.saturating_add(max_age_secs(max_age)),
            jti,
        }
    }

    /// Same claims, re-issued at `now` with a fresh expiry
    #[must_use]
    pub fn refreshed(mut self, now: i64, max_age: Duration) -> Self {
        self.issued_at = now;
        self.expires_at = now.saturating_add(max_age_secs(max_age));
        self
    }
}

impl TimeBound for SessionToken {
    fn issued_at(&self) -> i64 {
        self.issued_at
    }

    fn expires_at(&self) -> i64 {
        self.expires_at
    }
}

pub(crate) fn max_age_secs(max_age: Duration) -> i64 {
    i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX)
}

/// A compact JWS split into its decoded parts. The signature stays encoded
/// until verification.
#[derive(Debug, Clone)]
pub struct JwsTokenParts<T> {
    pub header: JwsHeader,
    pub payload: T,
    pub signing_input: String,
    pub signature: String,
}

impl<T: DeserializeOwned> TryFrom<&str> for JwsTokenParts<T> {
    type Error = SessionError;

    fn try_from(token: &str) -> Result<Self, Self::Error> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(SessionError::InvalidToken);
        };

        let header: JwsHeader = decode_segment(header_b64)?;
        let payload: T = decode_segment(payload_b64)?;

        Ok(Self {
            header,
            payload,
            signing_input: format!("{header_b64}.{payload_b64}"),
            signature: signature.to_string(),
        })
    }
}

fn decode_segment<T: DeserializeOwned>(segment: &str) -> Result<T, SessionError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| SessionError::InvalidToken)?;
    serde_json::from_slice(&bytes).map_err(|_| SessionError::InvalidToken)
}
