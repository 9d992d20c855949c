use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Form, Json, Router,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::Mutex};

pub const VALID_CODE: &str = "valid-code";
pub const ACCESS_TOKEN: &str = "mock-access-token";

#[derive(Debug, Default)]
pub struct ProviderLog {
    /// Form fields of the last token exchange
    pub token_form: Option<HashMap<String, String>>,
}

/// World ID stand-in serving `/token` and `/userinfo` on a random local port
pub struct MockProvider {
    pub issuer: String,
    pub log: Arc<Mutex<ProviderLog>>,
}

impl MockProvider {
    /// Starts the provider; `claims` is what `/userinfo` returns
    pub async fn start(claims: Value) -> Self {
        Self::start_with_delay(claims, Duration::ZERO).await
    }

    /// Same as [`Self::start`] with a token endpoint that answers after `delay`
    pub async fn start_with_delay(claims: Value, delay: Duration) -> Self {
        let log = Arc::new(Mutex::new(ProviderLog::default()));

        let router = Router::new()
            .route("/token", post(token))
            .route("/userinfo", get(userinfo))
            .layer(Extension(Arc::new(claims)))
            .layer(Extension(TokenDelay(delay)))
            .layer(Extension(log.clone()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock provider");
        let addr = listener.local_addr().expect("Mock provider has no address");
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });

        Self {
            issuer: format!("http://{addr}"),
            log,
        }
    }
}

/// Userinfo claims of a World ID user at the given verification level
pub fn world_id_claims(sub: &str, verification_level: &str) -> Value {
    json!({
        "sub": sub,
        "https://id.worldcoin.org/v1": { "verification_level": verification_level },
    })
}

#[derive(Clone, Copy)]
struct TokenDelay(Duration);

async fn token(
    Extension(log): Extension<Arc<Mutex<ProviderLog>>>,
    Extension(TokenDelay(delay)): Extension<TokenDelay>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    tokio::time::sleep(delay).await;

    let has_basic_auth = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Basic "));

    let accepted = has_basic_auth && form.get("code").map(String::as_str) == Some(VALID_CODE);
    log.lock().await.token_form = Some(form);

    if accepted {
        (
            StatusCode::OK,
            Json(json!({ "access_token": ACCESS_TOKEN, "token_type": "Bearer" })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant" })),
        )
    }
}

async fn userinfo(Extension(claims): Extension<Arc<Value>>, headers: HeaderMap) -> impl IntoResponse {
    let expected = format!("Bearer {ACCESS_TOKEN}");
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(expected.as_str());

    if authorized {
        (StatusCode::OK, Json(claims.as_ref().clone()))
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid_token" })),
        )
    }
}
