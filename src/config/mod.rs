#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::core::port_allocator::{TcpPortSource, DEFAULT_MAX_PORT_ATTEMPTS};
use crate::core::registry::{RegistrySettings, DEFAULT_MAX_REGISTER_ATTEMPTS};
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::{validate_ip_addr, validate_range, validate_socket_addr, Validate};
use std::net::SocketAddr;
use toml_config::TomlConfig;

pub const DEFAULT_BIND: &str = "127.0.0.1:1111";
pub const DEFAULT_PORT_HOST: &str = "127.0.0.1";
const MAX_ATTEMPTS_CEILING: u32 = 1000;

/// Fully resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: String,
    pub port_host: String,
    pub max_port_attempts: u32,
    pub max_register_attempts: u32,
    pub log_level: Option<String>,
    pub json_logs: bool,
    pub verbose: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            port_host: DEFAULT_PORT_HOST.to_string(),
            max_port_attempts: DEFAULT_MAX_PORT_ATTEMPTS,
            max_register_attempts: DEFAULT_MAX_REGISTER_ATTEMPTS,
            log_level: None,
            json_logs: false,
            verbose: false,
        }
    }
}

impl ServerConfig {
    /// Defaults overlaid with whatever the file sets.
    pub fn from_toml(file: &TomlConfig) -> Self {
        let mut config = Self::default();

        if let Some(server) = &file.server {
            if let Some(bind) = &server.bind {
                config.bind = bind.clone();
            }
        }
        if let Some(registry) = &file.registry {
            if let Some(host) = &registry.port_host {
                config.port_host = host.clone();
            }
            if let Some(n) = registry.max_port_attempts {
                config.max_port_attempts = n;
            }
            if let Some(n) = registry.max_register_attempts {
                config.max_register_attempts = n;
            }
        }
        if let Some(logging) = &file.logging {
            config.log_level = logging.level.clone();
            config.json_logs = logging.json.unwrap_or(false);
        }

        config
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        validate_socket_addr("server.bind", &self.bind)
    }

    pub fn port_source(&self) -> Result<TcpPortSource> {
        validate_ip_addr("registry.port_host", &self.port_host).map(TcpPortSource::new)
    }

    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            max_port_attempts: self.max_port_attempts,
            max_register_attempts: self.max_register_attempts,
        }
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<()> {
        self.bind_addr()?;
        self.port_source()?;
        validate_range(
            "registry.max_port_attempts",
            self.max_port_attempts,
            1,
            MAX_ATTEMPTS_CEILING,
        )?;
        validate_range(
            "registry.max_register_attempts",
            self.max_register_attempts,
            1,
            MAX_ATTEMPTS_CEILING,
        )?;
        if let Some(level) = &self.log_level {
            level.parse::<tracing::Level>().map_err(|e| {
                RegistryError::validation("logging.level", format!("'{}': {}", level, e))
            })?;
        }
        Ok(())
    }
}
