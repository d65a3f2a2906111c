//! API configuration

use config::{Config, ConfigError, Environment, Map};
use serde::Deserialize;

/// API configuration
///
/// Loaded from `API_`-prefixed environment variables; unset values keep
/// their defaults except `API_JWT_SECRET`, which must always be supplied.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// Cookie carrying the session token when no Authorization header is sent
    pub session_cookie_name: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: String::new(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/intake".to_string(),
            log_level: "info".to_string(),
            session_cookie_name: "jwt".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the process environment
    ///
    /// `DATABASE_URL` and `RUST_LOG` are honoured when the prefixed variables
    /// are absent.
    ///
    /// # Errors
    ///
    /// Fails when any `API_` variable cannot be parsed or no JWT secret is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(None)
    }

    /// Loads configuration from an explicit variable map instead of the
    /// process environment
    pub fn from_map(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::from_vars(Some(vars))
    }

    fn from_vars(vars: Option<Map<String, String>>) -> Result<Self, ConfigError> {
        let lookup = |key: &str| match &vars {
            Some(map) => map.get(key).cloned(),
            None => std::env::var(key).ok(),
        };

        let mut config: Self = Config::builder()
            .add_source(
                Environment::with_prefix("API")
                    .try_parsing(true)
                    .source(vars.clone()),
            )
            .build()?
            .try_deserialize()?;

        if lookup("API_DATABASE_URL").is_none() {
            if let Some(url) = lookup("DATABASE_URL") {
                config.database_url = url;
            }
        }
        if lookup("API_LOG_LEVEL").is_none() {
            if let Some(level) = lookup("RUST_LOG") {
                config.log_level = level;
            }
        }

        if config.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Message("API_JWT_SECRET must be set".to_string()));
        }
        Ok(config)
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
