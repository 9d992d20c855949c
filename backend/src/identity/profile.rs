use common_types::VerificationLevel;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Namespace key under which World ID nests its custom claims
pub const WORLD_ID_CLAIMS_NAMESPACE: &str = "https://id.worldcoin.org/v1";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile is missing the `sub` claim")]
    MissingSubject,

    #[error("Malformed profile claims: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Raw claims as returned by the provider's userinfo endpoint
#[derive(Debug, Deserialize)]
struct WorldIdClaims {
    sub: Option<String>,
    name: Option<String>,
    email: Option<String>,
    picture: Option<String>,
    /// Kept loose so an unexpected shape never fails the login
    #[serde(rename = "https://id.worldcoin.org/v1")]
    world_id: Option<Value>,
}

/// Typed identity profile, supplied once per login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProfile {
    pub sub: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub picture: Option<String>,
    pub verification_level: Option<VerificationLevel>,
}

/// Strings map to a level; numbers and booleans keep their JSON text
fn verification_level(raw: Value) -> Option<VerificationLevel> {
    match raw {
        Value::String(level) if !level.is_empty() => Some(VerificationLevel::from(level)),
        Value::Number(level) => Some(VerificationLevel::from(level.to_string())),
        Value::Bool(level) => Some(VerificationLevel::from(level.to_string())),
        Value::Null | Value::String(_) => None,
        other => {
            tracing::warn!(%other, "Ignoring non-scalar World ID verification level");
            None
        }
    }
}

impl IdentityProfile {
    /// Maps untrusted provider claims into a typed profile.
    ///
    /// The verification level is carried through as sent, including levels this
    /// service does not know about yet.
    ///
    /// # Errors
    /// - `ProfileError::Malformed` - claims are not a JSON object of the expected shape
    /// - `ProfileError::MissingSubject` - `sub` is absent or empty
    pub fn from_userinfo(claims: Value) -> Result<Self, ProfileError> {
        let mut claims: WorldIdClaims = serde_json::from_value(claims)?;

        let sub = claims
            .sub
            .filter(|sub| !sub.is_empty())
            .ok_or(ProfileError::MissingSubject)?;

        let verification_level = claims
            .world_id
            .as_mut()
            .and_then(|ns| ns.get_mut("verification_level"))
            .map(Value::take)
            .and_then(verification_level);

        if let Some(level) = verification_level.as_ref().filter(|level| !level.is_known()) {
            tracing::warn!(%level, "Unrecognized World ID verification level");
        }

        Ok(Self {
            sub,
            name: claims.name,
            email: claims.email,
            picture: claims.picture,
            verification_level,
        })
    }
}
