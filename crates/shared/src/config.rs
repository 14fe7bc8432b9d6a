//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Checkout provider configuration.
    pub checkout: CheckoutConfig,
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
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Checkout provider configuration for mobile-money wallet top-ups.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    /// Provider checkout-session endpoint.
    pub checkout_url: String,
    /// Provider space identifier.
    pub space_id: String,
    /// Bearer token for the provider API.
    pub access_token: String,
    /// Public base URL of this service, used to build callback URLs.
    pub redirect_base_url: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            checkout_url: "http://localhost:9090/v1/checkout-sessions".to_string(),
            space_id: String::new(),
            access_token: String::new(),
            redirect_base_url: "http://localhost:8080".to_string(),
        }
    }
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
            .add_source(config::Environment::with_prefix("PESA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
