// Configuration module entry point
// Layered configuration: defaults, optional file, environment

mod types;

use std::net::SocketAddr;

pub use types::{Config, LoggingConfig, ServerConfig};

/// Environment variable prefix, e.g. `API_SERVER__PORT=9000`
pub const ENV_PREFIX: &str = "API";

impl Config {
    /// Load `config.toml` (or `config.json`, ...) from the working directory
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from the given file path (extension optional).
    /// A missing file is not an error; defaults and environment apply.
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let defaults = ServerConfig::default();
        let logging = LoggingConfig::default();

        let settings = config::Config::builder()
            .set_default("server.host", defaults.host)?
            .set_default("server.port", i64::from(defaults.port))?
            .set_default("server.keep_alive", defaults.keep_alive)?
            .set_default("logging.access_log", logging.access_log)?
            .set_default("logging.access_log_format", logging.access_log_format)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid address '{}:{}': {e}", self.host, self.port))
    }
}
