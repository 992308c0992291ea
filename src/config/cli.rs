use super::toml_config::TomlConfig;
use super::ServerConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "discovery-server")]
#[command(about = "In-memory service registry handing out instance ids and free ports")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address the HTTP server listens on [default: 127.0.0.1:1111]
    #[arg(long)]
    pub bind: Option<String>,

    /// Host used when asking the OS for ephemeral ports [default: 127.0.0.1]
    #[arg(long)]
    pub port_host: Option<String>,

    /// Ephemeral port requests per registration before giving up [default: 10]
    #[arg(long)]
    pub max_port_attempts: Option<u32>,

    /// Registration attempts on id/port collisions [default: 5]
    #[arg(long)]
    pub max_register_attempts: Option<u32>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

impl CliConfig {
    /// Loads the file named by `--config` (if any) and applies the flags on top.
    pub fn resolve(&self) -> Result<ServerConfig> {
        let file = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        let mut config = ServerConfig::from_toml(&file);
        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }
        if let Some(host) = &self.port_host {
            config.port_host = host.clone();
        }
        if let Some(n) = self.max_port_attempts {
            config.max_port_attempts = n;
        }
        if let Some(n) = self.max_register_attempts {
            config.max_register_attempts = n;
        }
        config.verbose = self.verbose;
        config.json_logs |= self.json_logs;

        Ok(config)
    }
}
