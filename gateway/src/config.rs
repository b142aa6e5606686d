//! Configuration for the gateway command service.

use config::builder::DefaultState;
use config::{Config as ConfigLoader, ConfigBuilder, ConfigError, Environment, File};
use mesh_gateway_common::DEFAULT_PORT;
use serde::Deserialize;

/// Main configuration structure for the gateway.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub usbnet: UsbNetConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ApiConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// USB network bring-up.
#[derive(Debug, Clone, Deserialize)]
pub struct UsbNetConfig {
    /// When false the interface is treated as absent even if the backend is compiled in.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Network interface exposed by the USB gadget.
    #[serde(default = "default_interface")]
    pub interface: String,
}

impl Default for UsbNetConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            interface: default_interface(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set.
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_true() -> bool {
    true
}
fn default_interface() -> String {
    "usb0".to_string()
}
fn default_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (GATEWAY__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            ConfigLoader::builder()
                .add_source(File::with_name("config").required(false))
                .add_source(
                    Environment::with_prefix("GATEWAY")
                        .separator("__")
                        .try_parsing(true),
                ),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .set_default("api.host", default_host())?
            .set_default("api.port", default_port() as i64)?
            .set_default("usbnet.interface", default_interface())?
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api.bind_addr(), "0.0.0.0:8080");
        assert!(config.usbnet.enabled);
        assert_eq!(config.usbnet.interface, "usb0");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_empty_sources_use_defaults() {
        let config = Config::from_builder(ConfigLoader::builder()).unwrap();
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.api.port, 8080);
        assert!(config.usbnet.enabled);
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            [api]
            port = 9090

            [usbnet]
            enabled = false
            interface = "usb1"

            [logging]
            level = "debug"
        "#;
        let config =
            Config::from_builder(ConfigLoader::builder().add_source(File::from_str(toml, FileFormat::Toml)))
                .unwrap();

        assert_eq!(config.api.bind_addr(), "0.0.0.0:9090");
        assert!(!config.usbnet.enabled);
        assert_eq!(config.usbnet.interface, "usb1");
        assert_eq!(config.logging.level, "debug");
    }
}
