use std::sync::Arc;

use backend::{
    engine::{AuthEngine, WorldIdEngine},
    identity::WorldIdCallbacks,
    server,
    types::{AuthConfig, Environment},
};
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    // JSON logs for staging/production, human readable for development
    if environment.json_logs() {
        fmt().json().with_env_filter(env_filter).init();
    } else {
        fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AuthConfig::from_env(environment)?);
    if environment.debug_enabled() {
        tracing::debug!(?config, "Loaded auth configuration");
    }

    let engine: Arc<dyn AuthEngine> = Arc::new(WorldIdEngine::new(
        config.clone(),
        Arc::new(WorldIdCallbacks),
    )?);

    server::start(config, engine).await
}
