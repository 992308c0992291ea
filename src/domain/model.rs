use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One live deployment of a service. Never mutated once inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    pub id: String,
    pub service_name: String,
    pub port: u16,
}

/// What a caller gets back from a successful registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub id: String,
    pub port: u16,
}

/// Per-instance entry as seen by readers of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceEntry {
    pub port: u16,
}

impl From<&Instance> for InstanceEntry {
    fn from(instance: &Instance) -> Self {
        Self {
            port: instance.port,
        }
    }
}

/// Point-in-time copy of the registry: service name -> instance id -> entry.
///
/// Sorted maps keep the serialized form deterministic. A service key is only
/// present while it has at least one instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrySnapshot {
    pub services: BTreeMap<String, BTreeMap<String, InstanceEntry>>,
}

impl RegistrySnapshot {
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn service(&self, name: &str) -> Option<&BTreeMap<String, InstanceEntry>> {
        self.services.get(name)
    }

    pub fn instance_count(&self) -> usize {
        self.services.values().map(BTreeMap::len).sum()
    }

    /// Finds the service that owns `id`, if any.
    pub fn owner_of(&self, id: &str) -> Option<&str> {
        self.services
            .iter()
            .find(|(_, instances)| instances.contains_key(id))
            .map(|(name, _)| name.as_str())
    }
}
