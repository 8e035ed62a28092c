//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate. Each
//! sub-module represents a logical configuration section, and every field
//! carries a serde default so that an empty configuration is valid.

pub mod app;
pub mod client;
pub mod logging;
pub mod realtime;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::client::ClientConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "EXAMHUB";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Status service listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Status service engine settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Real-time client settings.
    #[serde(default)]
    pub client: ClientConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// Sources, lowest precedence first: `config/default`, `config/{env}`,
    /// the explicit `path` (which must exist when given), and environment
    /// variables such as `EXAMHUB__CLIENT__ENDPOINT`.
    pub fn load(env: &str, path: Option<&str>) -> Result<Self, AppError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false));

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that load fine but cannot be used.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.realtime.channel_buffer_size == 0 {
            return Err(AppError::configuration(
                "realtime.channel_buffer_size must be at least 1",
            ));
        }
        if self.client.outbound_buffer_size == 0 {
            return Err(AppError::configuration(
                "client.outbound_buffer_size must be at least 1",
            ));
        }
        if self.client.notification_capacity == 0 {
            return Err(AppError::configuration(
                "client.notification_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}
