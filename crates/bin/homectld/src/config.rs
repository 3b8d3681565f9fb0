//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `homectl.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use homectl_domain::capability::BaseShape;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Identity of this controller.
    pub controller: ControllerConfig,
    /// Device registry / API gateway settings.
    pub registry: RegistryConfig,
    /// Reconciliation loop settings.
    pub polling: PollingConfig,
    /// Upper bounds for outbound calls.
    pub timeouts: TimeoutsConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Controller identity.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Name the registry knows this controller by.
    pub name: String,
    /// Base shape shared by every device of this controller.
    pub kind: BaseShape,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Base URL of the API gateway fronting the registry and other controllers.
    pub gateway_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Re-run the reconciliation cycle on a timer.
    pub enabled: bool,
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub vendor_ms: u64,
    pub remote_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `homectl.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, an
    /// override cannot be parsed, or a value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("homectl.toml")?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    /// Apply overrides read through `lookup` (the process environment in
    /// production). Later keys win over earlier ones.
    fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("HOMECTL_HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("HOMECTL_PORT") {
            self.server.port = parse("HOMECTL_PORT", &val)?;
        }
        if let Some(val) = lookup("HOMECTL_BIND") {
            let (host, port) = val.rsplit_once(':').ok_or_else(|| ConfigError::Env {
                key: "HOMECTL_BIND",
                value: val.clone(),
            })?;
            self.server.port = parse("HOMECTL_BIND", port)?;
            self.server.host = host.to_string();
        }
        if let Some(val) = lookup("HOMECTL_CONTROLLER_NAME") {
            self.controller.name = val;
        }
        if let Some(val) = lookup("HOMECTL_CONTROLLER_KIND") {
            self.controller.kind = parse("HOMECTL_CONTROLLER_KIND", &val)?;
        }
        if let Some(val) = lookup("API_GATEWAY") {
            self.registry.gateway_url = val;
        }
        if let Some(val) = lookup("HOMECTL_GATEWAY") {
            self.registry.gateway_url = val;
        }
        if let Some(val) = lookup("HOMECTL_POLLING_ENABLED") {
            self.polling.enabled = parse("HOMECTL_POLLING_ENABLED", &val)?;
        }
        if let Some(val) = lookup("HOMECTL_POLLING_INTERVAL_MS") {
            self.polling.interval_ms = parse("HOMECTL_POLLING_INTERVAL_MS", &val)?;
        }
        if let Some(val) = lookup("HOMECTL_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.controller.name.is_empty() {
            return Err(ConfigError::Validation(
                "controller name must not be empty".to_string(),
            ));
        }
        if self.polling.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "polling interval must be non-zero".to_string(),
            ));
        }
        if self.timeouts.vendor_ms == 0 || self.timeouts.remote_ms == 0 {
            return Err(ConfigError::Validation(
                "timeouts must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[must_use]
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling.interval_ms)
    }

    #[must_use]
    pub fn vendor_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.vendor_ms)
    }

    #[must_use]
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.timeouts.remote_ms)
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Env {
        key,
        value: value.to_string(),
    })
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            name: "service.controller.virtual".to_string(),
            kind: BaseShape::Light,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            gateway_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ms: 30_000,
        }
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            vendor_ms: 5_000,
            remote_ms: 5_000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homectld=info,homectl=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Environment override with an unparsable value.
    #[error("invalid value '{value}' for {key}")]
    Env { key: &'static str, value: String },
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
