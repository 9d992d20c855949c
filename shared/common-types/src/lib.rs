//! Wire types shared between the auth backend and its clients

use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use strum::{EnumString, IntoStaticStr};

/// Strength of the proof of personhood behind a World ID login.
///
/// Levels the provider adds later are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, IntoStaticStr)]
#[serde(from = "String", into = "String")]
#[strum(serialize_all = "snake_case")]
pub enum VerificationLevel {
    Orb,
    SecureDocument,
    Document,
    Device,
    #[strum(default)]
    Other(String),
}

impl VerificationLevel {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Other(level) => level,
            known => {
                let name: &'static str = known.into();
                name
            }
        }
    }

    /// Whether this is one of the levels World ID documents today
    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for VerificationLevel {
    fn from(level: String) -> Self {
        Self::from_str(&level).unwrap_or(Self::Other(level))
    }
}

impl From<VerificationLevel> for String {
    fn from(level: VerificationLevel) -> Self {
        match level {
            VerificationLevel::Other(level) => level,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User object exposed by the session endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worldcoin_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_type: Option<VerificationLevel>,
}

/// Session view returned by `GET <base>/session`.
///
/// An unauthenticated request gets the empty object `{}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    /// RFC 3339 expiry of the underlying session token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
}

impl SessionView {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfResponse {
    pub csrf_token: String,
}

/// Response of the sign-in and sign-out actions: where the browser goes next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedirectResponse {
    pub url: String,
}

/// Form submitted to `POST <base>/signin/{provider}` and `POST <base>/signout`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthActionForm {
    #[serde(default)]
    pub csrf_token: Option<String>,
    #[serde(default)]
    pub callback_url: Option<String>,
    /// Ask for a JSON answer instead of a redirect; `true` or `"true"`
    #[serde(default, deserialize_with = "lenient_flag")]
    pub json: Option<bool>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

/// Accepts a JSON boolean or its string form, as sent by urlencoded forms
fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Flag>::deserialize(deserializer)?.map(|flag| match flag {
        Flag::Bool(value) => value,
        Flag::Text(value) => parse_flag(&value),
    }))
}

/// Parses a form flag the way [`AuthActionForm::json`] does
#[must_use]
pub fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}
