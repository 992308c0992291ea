use crate::core::PortSource;
use crate::utils::error::{AllocationError, Result};
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpListener};

pub const DEFAULT_MAX_PORT_ATTEMPTS: u32 = 10;

/// Asks the OS for an ephemeral port by binding to port 0 on `host`.
///
/// The listener is dropped before returning, so the port is released on
/// every path.
#[derive(Debug, Clone)]
pub struct TcpPortSource {
    host: IpAddr,
}

impl TcpPortSource {
    pub fn new(host: IpAddr) -> Self {
        Self { host }
    }
}

impl Default for TcpPortSource {
    fn default() -> Self {
        Self::new(IpAddr::V4(Ipv4Addr::LOCALHOST))
    }
}

impl PortSource for TcpPortSource {
    fn ephemeral_port(&self) -> std::io::Result<u16> {
        let listener = TcpListener::bind(SocketAddr::new(self.host, 0))?;
        let port = listener.local_addr()?.port();
        drop(listener);
        Ok(port)
    }
}

pub struct PortAllocator<P: PortSource> {
    source: P,
    max_attempts: u32,
}

impl<P: PortSource> PortAllocator<P> {
    pub fn new(source: P, max_attempts: u32) -> Self {
        Self {
            source,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns a port not present in `in_use`.
    ///
    /// A bind failure is permanent and returned at once; a collision with a
    /// live instance is retried up to `max_attempts` times.
    pub fn allocate(&self, in_use: &HashSet<u16>) -> Result<u16> {
        for attempt in 1..=self.max_attempts {
            let port = self
                .source
                .ephemeral_port()
                .map_err(AllocationError::SystemResourceUnavailable)?;

            if !in_use.contains(&port) {
                tracing::debug!(port, attempt, "Allocated ephemeral port");
                return Ok(port);
            }

            tracing::debug!(port, attempt, "Ephemeral port already held, asking again");
        }

        Err(AllocationError::ExhaustedRetries {
            attempts: self.max_attempts,
        }
        .into())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Hands out a fixed sequence of ports, then fails like an exhausted OS.
    pub struct ScriptedPorts {
        ports: Mutex<VecDeque<u16>>,
    }

    impl ScriptedPorts {
        pub fn new(ports: impl IntoIterator<Item = u16>) -> Self {
            Self {
                ports: Mutex::new(ports.into_iter().collect()),
            }
        }

        pub fn remaining(&self) -> usize {
            self.ports.lock().len()
        }
    }

    impl PortSource for ScriptedPorts {
        fn ephemeral_port(&self) -> std::io::Result<u16> {
            self.ports.lock().pop_front().ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::AddrNotAvailable, "no ports left")
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ScriptedPorts;
    use super::*;
    use crate::utils::error::RegistryError;

    #[test]
    fn test_os_source_returns_bindable_port() {
        let source = TcpPortSource::default();
        let port = source.ephemeral_port().unwrap();
        assert_ne!(port, 0);

        // the listener used to find the port is gone, so the port can be bound again
        let rebound = TcpListener::bind(("127.0.0.1", port));
        assert!(rebound.is_ok());
    }

    #[test]
    fn test_allocate_skips_ports_in_use() {
        let allocator = PortAllocator::new(ScriptedPorts::new([4000, 4001, 4002]), 10);
        let in_use: HashSet<u16> = [4000, 4001].into_iter().collect();

        assert_eq!(allocator.allocate(&in_use).unwrap(), 4002);
    }

    #[test]
    fn test_allocate_exhausts_retries() {
        let allocator = PortAllocator::new(ScriptedPorts::new([4000, 4000, 4000, 4001]), 3);
        let in_use: HashSet<u16> = [4000].into_iter().collect();

        let err = allocator.allocate(&in_use).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Allocation(AllocationError::ExhaustedRetries { attempts: 3 })
        ));
        assert_eq!(allocator.source.remaining(), 1);
    }

    #[test]
    fn test_bind_failure_is_not_retried() {
        let allocator = PortAllocator::new(ScriptedPorts::new([]), 5);

        let err = allocator.allocate(&HashSet::new()).unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Allocation(AllocationError::SystemResourceUnavailable(_))
        ));
        assert_eq!(err.kind(), "allocation_failed");
    }

    #[test]
    fn test_zero_attempts_still_tries_once() {
        let allocator = PortAllocator::new(ScriptedPorts::new([4000]), 0);
        assert_eq!(allocator.max_attempts(), 1);
        assert_eq!(allocator.allocate(&HashSet::new()).unwrap(), 4000);
    }
}
