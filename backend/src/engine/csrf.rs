//! Double-submit CSRF protection.
//!
//! The cookie holds `token|hmac(secret, token)`; state-changing actions must
//! submit the same `token` in their form body. The HMAC proves the cookie was
//! minted by this service, the form value proves the page could read it.

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::session::random_hex;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_BYTES: usize = 32;

/// CSRF token resolved for the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken {
    pub token: String,
    /// Cookie value to set when the request carried no valid cookie
    pub new_cookie: Option<String>,
}

/// Reuses a valid CSRF cookie or mints a new token
#[must_use]
pub fn resolve(cookie_value: Option<&str>, secret: &str) -> CsrfToken {
    if let Some(token) = cookie_value.and_then(|value| verified_token(value, secret)) {
        return CsrfToken {
            token: token.to_string(),
            new_cookie: None,
        };
    }

    let token = random_hex(TOKEN_BYTES);
    let new_cookie = mac(&token, secret).map(|hash| format!("{token}|{}", hex::encode(hash)));
    CsrfToken { token, new_cookie }
}

/// True when the cookie is authentic and the submitted token matches it.
///
/// The submitted token is compared through its HMAC in constant time.
#[must_use]
pub fn verify(cookie_value: Option<&str>, submitted: Option<&str>, secret: &str) -> bool {
    let (Some(cookie_value), Some(submitted)) = (cookie_value, submitted) else {
        return false;
    };
    let Some((token, hash)) = split_cookie(cookie_value) else {
        return false;
    };

    mac_matches(token, &hash, secret) && mac_matches(submitted, &hash, secret)
}

fn split_cookie(cookie_value: &str) -> Option<(&str, Vec<u8>)> {
    let (token, hash) = cookie_value.split_once('|')?;
    Some((token, hex::decode(hash).ok()?))
}

fn verified_token<'a>(cookie_value: &'a str, secret: &str) -> Option<&'a str> {
    let (token, hash) = split_cookie(cookie_value)?;
    mac_matches(token, &hash, secret).then_some(token)
}

fn mac_matches(value: &str, hash: &[u8], secret: &str) -> bool {
    HmacSha256::new_from_slice(secret.as_bytes()).is_ok_and(|mut mac| {
        mac.update(value.as_bytes());
        mac.verify_slice(hash).is_ok()
    })
}

fn mac(token: &str, secret: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).ok()?;
    mac.update(token.as_bytes());
    Some(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "csrf-test-secret";

    #[test]
    fn test_new_token_when_cookie_missing() {
        let csrf = resolve(None, SECRET);
        assert_eq!(csrf.token.len(), 64);
        let cookie = csrf.new_cookie.unwrap();
        assert!(cookie.starts_with(&format!("{}|", csrf.token)));
    }

    #[test]
    fn test_valid_cookie_is_reused() {
        let first = resolve(None, SECRET);
        let cookie = first.new_cookie.clone().unwrap();

        let second = resolve(Some(&cookie), SECRET);
        assert_eq!(second.token, first.token);
        assert!(second.new_cookie.is_none());
    }

    #[test]
    fn test_forged_cookie_is_replaced() {
        let forged = format!("{}|{}", "a".repeat(64), "00".repeat(32));
        let csrf = resolve(Some(&forged), SECRET);
        assert_ne!(csrf.token, "a".repeat(64));
        assert!(csrf.new_cookie.is_some());
    }

    #[test]
    fn test_verify_double_submit() {
        let csrf = resolve(None, SECRET);
        let cookie = csrf.new_cookie.clone().unwrap();

        assert!(verify(Some(&cookie), Some(&csrf.token), SECRET));
        assert!(!verify(Some(&cookie), Some("other"), SECRET));
        assert!(!verify(Some(&cookie), None, SECRET));
        assert!(!verify(None, Some(&csrf.token), SECRET));
        assert!(!verify(Some(&cookie), Some(&csrf.token), "another-secret"));
    }

    #[test]
    fn test_verify_rejects_hash_paired_with_other_token() {
        let csrf = resolve(None, SECRET);
        let (_, hash) = csrf.new_cookie.as_deref().unwrap().split_once('|').unwrap();
        let swapped = format!("{}|{hash}", "b".repeat(64));

        assert!(!verify(Some(&swapped), Some(&csrf.token), SECRET));
        assert!(!verify(Some(&swapped), Some(&"b".repeat(64)), SECRET));
        assert!(!verify(Some("no-separator"), Some("no-separator"), SECRET));
    }
}
