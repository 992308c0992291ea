use crate::domain::model::{Instance, InstanceEntry, RegistrySnapshot};
use crate::utils::error::{ConflictKind, RegistryError, Result};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Default)]
struct Registry {
    /// service name -> instance id -> instance. A group is never empty.
    groups: HashMap<String, HashMap<String, Instance>>,
    /// instance id -> owning service name. Ids are unique registry-wide.
    owners: HashMap<String, String>,
    /// ports held by live instances.
    ports: HashSet<u16>,
}

/// Authoritative registry state.
///
/// Every mutation runs its whole check-and-mutate sequence under one write
/// lock, because the port uniqueness rule spans all groups. Nothing that
/// blocks on I/O is called while the lock is held.
#[derive(Debug, Default)]
pub struct RegistryStore {
    inner: RwLock<Registry>,
}

impl RegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, service_name: &str, id: &str, port: u16) -> Result<Instance> {
        let mut registry = self.inner.write();

        if registry.owners.contains_key(id) {
            return Err(RegistryError::Conflict(ConflictKind::DuplicateId {
                id: id.to_string(),
            }));
        }
        if registry.ports.contains(&port) {
            return Err(RegistryError::Conflict(ConflictKind::DuplicatePort { port }));
        }

        let instance = Instance {
            id: id.to_string(),
            service_name: service_name.to_string(),
            port,
        };

        registry.ports.insert(port);
        registry
            .owners
            .insert(id.to_string(), service_name.to_string());
        registry
            .groups
            .entry(service_name.to_string())
            .or_default()
            .insert(id.to_string(), instance.clone());

        Ok(instance)
    }

    /// Removes the instance and returns the name of the service it belonged to.
    pub fn remove(&self, id: &str) -> Result<String> {
        let mut guard = self.inner.write();
        let registry = &mut *guard;

        let service_name = registry
            .owners
            .remove(id)
            .ok_or_else(|| RegistryError::NotFound { id: id.to_string() })?;

        // owners, groups and ports only ever change together under this lock
        if let Some(group) = registry.groups.get_mut(&service_name) {
            if let Some(instance) = group.remove(id) {
                registry.ports.remove(&instance.port);
            }
            if group.is_empty() {
                registry.groups.remove(&service_name);
            }
        }

        Ok(service_name)
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        let registry = self.inner.read();

        let services = registry
            .groups
            .iter()
            .map(|(name, instances)| {
                let entries: BTreeMap<String, InstanceEntry> = instances
                    .iter()
                    .map(|(id, instance)| (id.clone(), InstanceEntry::from(instance)))
                    .collect();
                (name.clone(), entries)
            })
            .collect();

        RegistrySnapshot { services }
    }

    pub fn ports_in_use(&self) -> HashSet<u16> {
        self.inner.read().ports.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
