mod config;
mod environment;

pub use config::{
    AuthConfig, ConfigError, ProviderConfig, DEFAULT_BASE_PATH, DEFAULT_SITE_URL,
    DEFAULT_WORLD_ID_ISSUER, ENGINE_TIMEOUT, SESSION_MAX_AGE,
};
pub use environment::Environment;
