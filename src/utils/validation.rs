use crate::utils::error::{RegistryError, Result};
use std::net::{IpAddr, SocketAddr};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RegistryError::validation(
            field_name,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(RegistryError::validation(
            field_name,
            format!("Value {} must be between {} and {}", value, min, max),
        ));
    }
    Ok(())
}

pub fn validate_socket_addr(field_name: &str, value: &str) -> Result<SocketAddr> {
    value.parse::<SocketAddr>().map_err(|e| {
        RegistryError::validation(
            field_name,
            format!("'{}' is not a socket address: {}", value, e),
        )
    })
}

pub fn validate_ip_addr(field_name: &str, value: &str) -> Result<IpAddr> {
    value.parse::<IpAddr>().map_err(|e| {
        RegistryError::validation(
            field_name,
            format!("'{}' is not an IP address: {}", value, e),
        )
    })
}
