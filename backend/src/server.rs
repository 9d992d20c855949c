use std::{sync::Arc, time::Duration};

use axum::{Extension, Router};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{
    engine::AuthEngine,
    routes::{self, CorsPolicy},
    types::AuthConfig,
};

const DEFAULT_PORT: u16 = 8001;
/// Outer bound only; delegated auth requests are cut off earlier by the entry point
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Builds the application router with its dependencies attached
///
/// # Errors
///
/// Returns an error if the site origin cannot be used as a CORS header value
pub fn app(config: Arc<AuthConfig>, engine: Arc<dyn AuthEngine>) -> anyhow::Result<Router> {
    let cors = CorsPolicy::new(&config.site_origin)?;

    Ok(routes::handler(&config.base_path)
        .layer(Extension(cors))
        .layer(Extension(engine))
        .layer(Extension(config)))
}

/// Starts the server with the given configuration and auth engine
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(config: Arc<AuthConfig>, engine: Arc<dyn AuthEngine>) -> anyhow::Result<()> {
    let environment = config.environment;
    let base_path = config.base_path.clone();
    let request_timeout = REQUEST_TIMEOUT.max(config.engine_timeout + Duration::from_secs(1));

    let router = app(config, engine)?
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout));

    let addr = std::net::SocketAddr::from((
        [0, 0, 0, 0],
        std::env::var("PORT").map_or(Ok(DEFAULT_PORT), |p| p.parse())?,
    ));

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 World ID auth started on http://{addr}{base_path} ({environment})");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {e}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
