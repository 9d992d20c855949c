//! Platform-neutral request and response shapes exchanged with the engine

use std::collections::HashMap;

use axum::body::Bytes;
use axum_extra::extract::cookie::{Cookie, CookieJar};
use common_types::{parse_flag, AuthActionForm};
use http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use serde::Serialize;

use super::error::EngineError;

/// A request routed to the engine, already stripped of the base path
#[derive(Debug, Clone)]
pub struct EngineRequest {
    pub method: Method,
    /// Path segments after the base path, e.g. `["callback", "worldcoin"]`
    pub action: Vec<String>,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
    pub cookies: CookieJar,
    pub body: Bytes,
}

impl EngineRequest {
    /// Splits `path` relative to `base_path` and parses query and cookies.
    #[must_use]
    pub fn new(
        method: Method,
        base_path: &str,
        path: &str,
        query: Option<&str>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Self {
        let action = path
            .strip_prefix(base_path)
            .unwrap_or(path)
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(ToString::to_string)
            .collect();

        let query = query
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        let cookies = CookieJar::from_headers(&headers);

        Self {
            method,
            action,
            query,
            headers,
            cookies,
            body,
        }
    }

    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(Cookie::value)
    }

    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Action form from a urlencoded or JSON body. An unreadable body yields an
    /// empty form, which then fails the CSRF check.
    #[must_use]
    pub fn form(&self) -> AuthActionForm {
        let is_json = self
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));

        if is_json {
            return serde_json::from_slice(&self.body).unwrap_or_default();
        }

        let mut form = AuthActionForm::default();
        for (key, value) in url::form_urlencoded::parse(&self.body) {
            match key.as_ref() {
                "csrfToken" => form.csrf_token = Some(value.into_owned()),
                "callbackUrl" => form.callback_url = Some(value.into_owned()),
                "json" => form.json = Some(parse_flag(&value)),
                _ => {}
            }
        }
        form
    }
}

/// The engine's answer before the entry point applies its envelope
#[derive(Debug, Clone)]
pub struct EngineResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// JSON body; `None` for redirects
    pub body: Option<serde_json::Value>,
}

impl EngineResponse {
    /// # Errors
    ///
    /// Returns `EngineError::Serialization` if `body` cannot be represented as JSON
    pub fn json<T: Serialize>(status: StatusCode, body: &T) -> Result<Self, EngineError> {
        Ok(Self {
            status,
            headers: HeaderMap::new(),
            body: Some(serde_json::to_value(body)?),
        })
    }

    /// `{"error": code}` answer for requests the engine refuses
    #[must_use]
    pub fn client_error(status: StatusCode, code: &str) -> Self {
        tracing::warn!("Auth request refused: {status} {code}");
        Self {
            status,
            headers: HeaderMap::new(),
            body: Some(serde_json::json!({ "error": code })),
        }
    }

    #[must_use]
    pub fn redirect(location: &str) -> Self {
        let mut headers = HeaderMap::new();
        match HeaderValue::from_str(location) {
            Ok(value) => {
                headers.insert(header::LOCATION, value);
            }
            Err(_) => tracing::error!(%location, "Dropping unrepresentable redirect location"),
        }

        Self {
            status: StatusCode::FOUND,
            headers,
            body: None,
        }
    }

    /// Appends a `Set-Cookie` header, percent-encoding the value
    #[must_use]
    pub fn with_cookie(mut self, cookie: &Cookie<'_>) -> Self {
        match HeaderValue::from_str(&cookie.encoded().to_string()) {
            Ok(value) => {
                self.headers.append(header::SET_COOKIE, value);
            }
            Err(_) => tracing::error!(name = cookie.name(), "Dropping unrepresentable cookie"),
        }
        self
    }
}

/// Engine actions, resolved from method and path segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    Providers,
    Csrf,
    Session,
    SignIn(String),
    Callback(String),
    SignOut,
    Error,
    Unknown,
}

impl AuthAction {
    #[must_use]
    pub fn resolve(method: &Method, action: &[String]) -> Self {
        let segments: Vec<&str> = action.iter().map(String::as_str).collect();
        match (method, segments.as_slice()) {
            (&Method::GET, ["providers"]) => Self::Providers,
            (&Method::GET, ["csrf"]) => Self::Csrf,
            (&Method::GET, ["session"]) => Self::Session,
            (&Method::POST, ["signin", provider]) => Self::SignIn((*provider).to_string()),
            (&Method::GET | &Method::POST, ["callback", provider]) => {
                Self::Callback((*provider).to_string())
            }
            (&Method::POST, ["signout"]) => Self::SignOut,
            (&Method::GET, ["error"]) => Self::Error,
            _ => Self::Unknown,
        }
    }
}
