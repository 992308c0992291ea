use crate::core::port_allocator::{PortAllocator, TcpPortSource, DEFAULT_MAX_PORT_ATTEMPTS};
use crate::core::identity::UuidGenerator;
use crate::core::store::RegistryStore;
use crate::core::{IdGenerator, PortSource, Registration, RegistrySnapshot};
use crate::utils::error::{RegistryError, Result};
use crate::utils::validation::validate_non_empty_string;

pub const DEFAULT_MAX_REGISTER_ATTEMPTS: u32 = 5;

/// Tunables for a [`RegistryService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrySettings {
    pub max_port_attempts: u32,
    pub max_register_attempts: u32,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            max_port_attempts: DEFAULT_MAX_PORT_ATTEMPTS,
            max_register_attempts: DEFAULT_MAX_REGISTER_ATTEMPTS,
        }
    }
}

/// The only entry point transport code talks to.
///
/// Composes id generation, port allocation and the store. It holds no state
/// of its own beyond those three.
pub struct RegistryService<P: PortSource = TcpPortSource, G: IdGenerator = UuidGenerator> {
    store: RegistryStore,
    allocator: PortAllocator<P>,
    ids: G,
    max_register_attempts: u32,
}

impl RegistryService {
    /// Service backed by OS ephemeral ports on `source`'s host and UUID v4 ids.
    pub fn with_os_ports(source: TcpPortSource, settings: RegistrySettings) -> Self {
        Self::new(source, UuidGenerator, settings)
    }
}

impl<P: PortSource, G: IdGenerator> RegistryService<P, G> {
    pub fn new(ports: P, ids: G, settings: RegistrySettings) -> Self {
        Self {
            store: RegistryStore::new(),
            allocator: PortAllocator::new(ports, settings.max_port_attempts),
            ids,
            max_register_attempts: settings.max_register_attempts.max(1),
        }
    }

    pub fn register(&self, service_name: &str) -> Result<Registration> {
        validate_non_empty_string("name", service_name)?;

        for attempt in 1..=self.max_register_attempts {
            let id = self.ids.new_id();
            // the bind happens here, outside the store lock
            let port = self.allocator.allocate(&self.store.ports_in_use())?;

            match self.store.insert(service_name, &id, port) {
                Ok(instance) => {
                    tracing::info!(
                        service = %instance.service_name,
                        id = %instance.id,
                        port = instance.port,
                        "Registered instance"
                    );
                    return Ok(Registration {
                        id: instance.id,
                        port: instance.port,
                    });
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(
                        service = %service_name,
                        attempt,
                        "Registration collided: {}",
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }

        Err(RegistryError::RegistrationFailed {
            attempts: self.max_register_attempts,
        })
    }

    pub fn unregister(&self, id: &str) -> Result<String> {
        let service_name = self.store.remove(id)?;
        tracing::info!(service = %service_name, id = %id, "Unregistered instance");
        Ok(service_name)
    }

    pub fn list(&self) -> RegistrySnapshot {
        self.store.snapshot()
    }

    pub fn instance_count(&self) -> usize {
        self.store.len()
    }
}
