//! Application configuration management.

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
    /// Finance module settings.
    #[serde(default)]
    pub finance: FinanceConfig,
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
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Apply pending migrations on startup.
    #[serde(default)]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// JWT settings as read from configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Finance module settings.
#[derive(Debug, Clone, Deserialize)]
pub struct FinanceConfig {
    /// Currency assigned to funds created without one.
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Page size used when a list request omits `limit`.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    /// Upper bound for `limit` on list requests.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Number of entries returned by the top contributors board by default.
    #[serde(default = "default_top_contributors_limit")]
    pub top_contributors_limit: u32,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            top_contributors_limit: default_top_contributors_limit(),
        }
    }
}

fn default_currency() -> String {
    crate::types::money::DEFAULT_CURRENCY.to_string()
}

fn default_page_size() -> u32 {
    20
}

fn default_max_page_size() -> u32 {
    100
}

fn default_top_contributors_limit() -> u32 {
    3
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TSNT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finance_defaults() {
        let finance = FinanceConfig::default();
        assert_eq!(finance.default_currency, "VND");
        assert_eq!(finance.default_page_size, 20);
        assert_eq!(finance.max_page_size, 100);
        assert_eq!(finance.top_contributors_limit, 3);
    }

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("TSNT__DATABASE__URL", Some("postgres://localhost/tsnt_test")),
                ("TSNT__JWT__SECRET", Some("secret")),
                ("TSNT__SERVER__PORT", Some("9090")),
                ("RUN_MODE", Some("test-no-such-file")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/tsnt_test");
                assert_eq!(config.database.max_connections, 10);
                assert!(!config.database.run_migrations);
                assert_eq!(config.jwt.secret, "secret");
                assert_eq!(config.jwt.access_token_expiry_secs, 900);
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.finance.default_currency, "VND");
            },
        );
    }

    #[test]
    fn test_load_requires_database_url() {
        temp_env::with_vars(
            [
                ("TSNT__DATABASE__URL", None::<&str>),
                ("TSNT__JWT__SECRET", Some("secret")),
                ("RUN_MODE", Some("test-no-such-file")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }
}
