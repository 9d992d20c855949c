use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::session::{max_age_secs, random_hex, TimeBound};

/// How long a user may take at the provider before the callback is refused
pub const CHALLENGE_MAX_AGE: Duration = Duration::from_secs(15 * 60);

/// OAuth state, PKCE verifier and nonce carried between sign-in and callback
/// in a signed cookie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub state: String,
    pub code_verifier: String,
    pub nonce: String,
    pub iat: i64,
    pub exp: i64,
}

impl Challenge {
    #[must_use]
    pub fn generate() -> Self {
        let mut verifier = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut verifier);
        let now = Utc::now().timestamp();

        Self {
            state: random_hex(16),
            code_verifier: URL_SAFE_NO_PAD.encode(verifier),
            nonce: random_hex(16),
            iat: now,
            exp: now + max_age_secs(CHALLENGE_MAX_AGE),
        }
    }

    /// PKCE `S256` challenge for `code_verifier`
    #[must_use]
    pub fn code_challenge(&self) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(self.code_verifier.as_bytes()))
    }
}

impl TimeBound for Challenge {
    fn issued_at(&self) -> i64 {
        self.iat
    }

    fn expires_at(&self) -> i64 {
        self.exp
    }
}
