use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    engine::{AuthEngine, WorldIdEngine},
    identity::WorldIdCallbacks,
    server,
    types::{AuthConfig, Environment, ProviderConfig},
};
use http::header::{CONTENT_TYPE, COOKIE};
use tower::ServiceExt;

use super::utils::BrowserCookies;

pub const SITE_URL: &str = "http://localhost:5173";
pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_CLIENT_ID: &str = "app_staging_test";
pub const TEST_CLIENT_SECRET: &str = "sk_test_secret";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

pub fn test_config(issuer: &str) -> AuthConfig {
    AuthConfig::new(
        Environment::Development,
        SITE_URL,
        ProviderConfig::new(TEST_CLIENT_ID, TEST_CLIENT_SECRET, issuer)
            .expect("Failed to build provider config"),
        TEST_SECRET,
    )
    .expect("Failed to build auth config")
}

/// Router wired the way the server wires it, driven with `oneshot`
pub struct TestSetup {
    pub router: Router,
    pub config: Arc<AuthConfig>,
}

impl TestSetup {
    /// Real World ID engine talking to `issuer`
    pub fn new(issuer: &str) -> Self {
        Self::with_auth_config(test_config(issuer))
    }

    /// Real World ID engine with a customized configuration
    pub fn with_auth_config(config: AuthConfig) -> Self {
        let config = Arc::new(config);
        let engine = WorldIdEngine::new(config.clone(), Arc::new(WorldIdCallbacks))
            .expect("Failed to build engine");
        Self::with_config(config, Arc::new(engine))
    }

    /// Any engine behind the entry point; the issuer is never contacted
    pub fn with_engine(engine: Arc<dyn AuthEngine>) -> Self {
        Self::with_config(Arc::new(test_config("https://id.worldcoin.org")), engine)
    }

    fn with_config(config: Arc<AuthConfig>, engine: Arc<dyn AuthEngine>) -> Self {
        setup_test_env();

        let router = server::app(config.clone(), engine).expect("Failed to build router");
        Self { router, config }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible")
    }

    pub async fn send_get_request(&self, route: &str, cookies: &BrowserCookies) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .header(COOKIE, cookies.header())
            .body(Body::empty())
            .expect("Failed to build request");

        self.send(request).await
    }

    pub async fn send_json_request(
        &self,
        route: &str,
        payload: serde_json::Value,
        cookies: &BrowserCookies,
    ) -> Response {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header(CONTENT_TYPE, "application/json")
            .header(COOKIE, cookies.header())
            .body(Body::from(payload.to_string()))
            .expect("Failed to build request");

        self.send(request).await
    }

    pub async fn send_form_request(
        &self,
        route: &str,
        form: &[(&str, &str)],
        cookies: &BrowserCookies,
    ) -> Response {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(form)
            .finish();

        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header(COOKIE, cookies.header())
            .body(Body::from(body))
            .expect("Failed to build request");

        self.send(request).await
    }
}
