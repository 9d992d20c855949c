//! Cookie names and flags for every cookie the engine sets

use std::time::Duration;

use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::session::max_age_secs;

/// Names of the engine cookies. All are `Secure`, `SameSite=Lax`, `Path=/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub session_token: String,
    pub callback_url: String,
    pub csrf_token: String,
    pub challenge: String,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            session_token: "__Secure-worldid.session-token".to_string(),
            callback_url: "__Secure-worldid.callback-url".to_string(),
            csrf_token: "__Host-worldid.csrf-token".to_string(),
            challenge: "__Secure-worldid.challenge".to_string(),
        }
    }
}

impl CookiePolicy {
    pub fn session_cookie(&self, token: String, max_age: Duration) -> Cookie<'static> {
        let mut cookie = secure_cookie(self.session_token.clone(), token, true);
        cookie.set_max_age(time::Duration::seconds(max_age_secs(max_age)));
        cookie
    }

    pub fn callback_url_cookie(&self, url: String) -> Cookie<'static> {
        secure_cookie(self.callback_url.clone(), url, false)
    }

    pub fn csrf_cookie(&self, value: String) -> Cookie<'static> {
        secure_cookie(self.csrf_token.clone(), value, true)
    }

    pub fn challenge_cookie(&self, token: String, max_age: Duration) -> Cookie<'static> {
        let mut cookie = secure_cookie(self.challenge.clone(), token, true);
        cookie.set_max_age(time::Duration::seconds(max_age_secs(max_age)));
        cookie
    }

    /// Cookie that makes the browser drop `name`
    pub fn removal(&self, name: &str) -> Cookie<'static> {
        let mut cookie = secure_cookie(name.to_string(), String::new(), true);
        cookie.make_removal();
        cookie
    }
}

fn secure_cookie(name: String, value: String, http_only: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(http_only)
        .same_site(SameSite::Lax)
        .path("/")
        .secure(true)
        .build()
}
