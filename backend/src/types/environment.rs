//! Environment configuration for different deployment stages

use std::env;

use tracing::Level;

use super::config::ConfigError;

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (local front end on `localhost`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable.
    ///
    /// Defaults to development when unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if `APP_ENV` contains an unknown stage
    pub fn from_env() -> Result<Self, ConfigError> {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(ConfigError::InvalidValue {
                name: "APP_ENV",
                reason: format!("Invalid environment: {env}"),
            }),
        }
    }

    /// Whether verbose auth diagnostics are enabled
    #[must_use]
    pub const fn debug_enabled(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Whether logs are emitted as JSON (for the log pipeline) rather than plain text
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Staging => write!(f, "staging"),
            Self::Development => write!(f, "development"),
        }
    }
}
