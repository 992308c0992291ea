pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;
pub use crate::config::ServerConfig;

pub use crate::adapters::http::{router, serve};
pub use crate::core::registry::{RegistryService, RegistrySettings};
pub use crate::domain::model::{Registration, RegistrySnapshot};
pub use crate::utils::error::{RegistryError, Result};
