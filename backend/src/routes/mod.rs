pub mod cors;
pub mod entry;
mod health;

use axum::{
    routing::{any, get},
    Router,
};

pub use cors::CorsPolicy;

/// Creates the router: the health check plus the auth entry point mounted on
/// `base_path` and everything below it. An empty `base_path` mounts at the root.
pub fn handler(base_path: &str) -> Router {
    let mount = if base_path.is_empty() { "/" } else { base_path };

    Router::new()
        .route("/health", get(health::handler))
        .route(mount, any(entry::handler))
        .route(&format!("{base_path}/{{*action}}"), any(entry::handler))
}
