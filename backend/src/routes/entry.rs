//! HTTP entry point for everything under the auth base path.
//!
//! Preflight requests are answered here. Every other request is handed to the
//! [`AuthEngine`] and its outcome is mapped onto the wire by two pure
//! functions: [`success_response`] and [`failure_response`].

use std::{any::Any, panic::AssertUnwindSafe, sync::Arc, time::Duration};

use axum::{
    body::{Body, Bytes},
    response::{IntoResponse, Response},
    Extension,
};
use futures::FutureExt;
use http::{header::CONTENT_TYPE, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use serde::Serialize;
use thiserror::Error;

use super::cors::CorsPolicy;
use crate::{
    engine::{AuthEngine, EngineError, EngineRequest, EngineResponse},
    types::AuthConfig,
};

const UNKNOWN_ERROR: &str = "Unknown error";

/// Anything that escaped the delegated call
#[derive(Debug, Error)]
pub enum EntryFailure {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("{}", .0.as_deref().unwrap_or(UNKNOWN_ERROR))]
    Panic(Option<String>),

    #[error("Auth request timed out after {0:?}")]
    Timeout(Duration),
}

/// Body of every 500 answer: exactly `error` and `details`
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: &'static str,
    pub details: String,
}

pub async fn handler(
    Extension(config): Extension<Arc<AuthConfig>>,
    Extension(engine): Extension<Arc<dyn AuthEngine>>,
    Extension(cors): Extension<CorsPolicy>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if method == Method::OPTIONS {
        return cors.preflight();
    }

    let request = EngineRequest::new(
        method,
        &config.base_path,
        uri.path(),
        uri.query(),
        headers,
        body,
    );

    match delegate(engine.as_ref(), request, config.engine_timeout).await {
        Ok(response) => success_response(&cors, response),
        Err(failure) => failure_response(&cors, &failure),
    }
}

/// Runs the engine within `limit`, turning a panic or an overrun into a failure
/// instead of a dropped connection
pub async fn delegate(
    engine: &dyn AuthEngine,
    request: EngineRequest,
    limit: Duration,
) -> Result<EngineResponse, EntryFailure> {
    let handled = AssertUnwindSafe(engine.handle(request)).catch_unwind();
    match tokio::time::timeout(limit, handled).await {
        Ok(Ok(result)) => result.map_err(EntryFailure::from),
        Ok(Err(panic)) => Err(EntryFailure::Panic(panic_message(panic.as_ref()))),
        Err(_) => Err(EntryFailure::Timeout(limit)),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> Option<String> {
    panic
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
}

fn json_headers(cors: &CorsPolicy) -> HeaderMap {
    let mut headers = cors.headers();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

/// Wraps an engine answer: CORS and JSON content type first, then the engine's
/// own headers (replacing ours on a name clash, repeated `Set-Cookie` kept).
/// The engine's status is forwarded as is so redirects keep working.
#[must_use]
pub fn success_response(cors: &CorsPolicy, response: EngineResponse) -> Response {
    let mut headers = json_headers(cors);
    headers.extend(response.headers);

    let body = response
        .body
        .map_or_else(Body::empty, |body| Body::from(body.to_string()));

    (response.status, headers, body).into_response()
}

/// The 500 envelope for a failed delegation
#[must_use]
pub fn failure_response(cors: &CorsPolicy, failure: &EntryFailure) -> Response {
    tracing::error!("Auth Error: {failure}");

    let envelope = ErrorEnvelope {
        error: "Internal Server Error",
        details: failure.to_string(),
    };
    let body = serde_json::to_string(&envelope).unwrap_or_else(|_| {
        r#"{"error":"Internal Server Error","details":"Unknown error"}"#.to_string()
    });

    (StatusCode::INTERNAL_SERVER_ERROR, json_headers(cors), body).into_response()
}
