//! Application configuration module
//!
//! Configuration is read from environment variables with the
//! `DIALOG_GATEWAY` prefix; nested values use double underscores.
//!
//! # Example
//!
//! ```no_run
//! use dialog_gateway::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod database;
mod error;
mod server;
mod upstream;

pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use server::{Environment, ServerConfig};
pub use upstream::UpstreamConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Upstream helper endpoints and the local model
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Loads `.env` if present, then reads `DIALOG_GATEWAY__*` variables:
    ///
    /// - `DIALOG_GATEWAY__SERVER__PORT=8000` -> `server.port = 8000`
    /// - `DIALOG_GATEWAY__DATABASE__URL=...` -> `database.url = ...`
    /// - `DIALOG_GATEWAY__UPSTREAM__REVIEW_URL=...` -> `upstream.review_url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or values
    /// cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("DIALOG_GATEWAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.upstream.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialog::Mode;
    use std::env;
    use std::sync::Mutex;

    // env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: [&str; 5] = [
        "DIALOG_GATEWAY__DATABASE__URL",
        "DIALOG_GATEWAY__SERVER__PORT",
        "DIALOG_GATEWAY__SERVER__ENVIRONMENT",
        "DIALOG_GATEWAY__UPSTREAM__REVIEW_URL",
        "DIALOG_GATEWAY__UPSTREAM__LOCAL_API_KEY",
    ];

    fn set_minimal_env() {
        env::set_var("DIALOG_GATEWAY__DATABASE__URL", "postgresql://test@localhost/test");
    }

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.environment, Environment::Development);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_upstream_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("DIALOG_GATEWAY__UPSTREAM__REVIEW_URL", "http://localhost:8002/review");
        env::set_var("DIALOG_GATEWAY__UPSTREAM__LOCAL_API_KEY", "sk-xxx");
        let result = AppConfig::load();
        clear_env();

        let targets = result.unwrap().upstream.targets();
        assert!(targets.contains_key(&Mode::CodeReview));
        assert!(targets.contains_key(&Mode::LocalModel));
        assert!(!targets.contains_key(&Mode::Agent));
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("DIALOG_GATEWAY__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().is_production());
    }

    #[test]
    fn test_missing_database_url_fails() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        assert!(AppConfig::load().is_err());
    }
}
