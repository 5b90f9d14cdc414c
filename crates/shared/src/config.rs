//! Application configuration management.
//!
//! Sources, later ones winning: `config/default`, `config/{RUN_MODE}`, then
//! `TALLY__SECTION__KEY` environment variables.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL (`postgres://...` or `sqlite://...`).
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Token signing settings.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expires_minutes: i64,
}

fn default_access_token_expiry() -> i64 {
    60
}

impl AppConfig {
    /// Loads configuration from config files and the environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("config-test")),
                ("TALLY__DATABASE__URL", Some("sqlite::memory:")),
                ("TALLY__JWT__SECRET", Some("env-secret")),
            ],
            || {
                let config = AppConfig::load().unwrap();

                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.database.min_connections, 1);
                assert_eq!(config.jwt.secret, "env-secret");
                assert_eq!(config.jwt.access_token_expires_minutes, 60);
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.server.host, "0.0.0.0");
            },
        );
    }

    #[test]
    fn test_load_fails_without_database_url() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("config-test")),
                ("TALLY__DATABASE__URL", None),
                ("TALLY__JWT__SECRET", Some("env-secret")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
