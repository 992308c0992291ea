use discovery_server::core::port_allocator::TcpPortSource;
use discovery_server::{RegistryService, RegistrySettings};
use std::collections::HashSet;
use std::sync::Arc;

const SERVICES: [&str; 4] = ["auth", "billing", "search", "mailer"];

fn shared_service() -> Arc<RegistryService> {
    Arc::new(RegistryService::with_os_ports(
        TcpPortSource::default(),
        RegistrySettings::default(),
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_registrations_hold_unique_ports() {
    let service = shared_service();

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let service = Arc::clone(&service);
            let name = SERVICES[i % SERVICES.len()];
            tokio::task::spawn_blocking(move || (name, service.register(name)))
        })
        .collect();

    let mut owned = Vec::new();
    for task in tasks {
        let (name, result) = task.await.unwrap();
        owned.push((name, result.unwrap()));
    }
    let registrations: Vec<_> = owned.iter().map(|(_, r)| r.clone()).collect();

    let ids: HashSet<&str> = registrations.iter().map(|r| r.id.as_str()).collect();
    let ports: HashSet<u16> = registrations.iter().map(|r| r.port).collect();
    assert_eq!(ids.len(), 64);
    assert_eq!(ports.len(), 64);

    let snapshot = service.list();
    assert_eq!(snapshot.instance_count(), 64);
    assert_eq!(snapshot.services.len(), SERVICES.len());

    let listed_ports: HashSet<u16> = snapshot
        .services
        .values()
        .flat_map(|instances| instances.values().map(|entry| entry.port))
        .collect();
    assert_eq!(listed_ports, ports);

    for (name, registration) in &owned {
        assert_eq!(snapshot.owner_of(&registration.id), Some(*name));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_interleaved_register_and_unregister() {
    let service = shared_service();

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let service = Arc::clone(&service);
            tokio::task::spawn_blocking(move || {
                let name = SERVICES[i % SERVICES.len()];
                let keep = service.register(name).unwrap();
                let released = service.register(name).unwrap();
                assert_eq!(service.unregister(&released.id).unwrap(), name);

                // a listing taken at any point never shows two holders of a port
                let snapshot = service.list();
                let ports: Vec<u16> = snapshot
                    .services
                    .values()
                    .flat_map(|instances| instances.values().map(|entry| entry.port))
                    .collect();
                let unique: HashSet<u16> = ports.iter().copied().collect();
                assert_eq!(unique.len(), ports.len());

                (name, keep)
            })
        })
        .collect();

    let mut kept = Vec::new();
    for task in tasks {
        kept.push(task.await.unwrap());
    }

    let snapshot = service.list();
    assert_eq!(snapshot.instance_count(), 32);
    for (name, registration) in &kept {
        assert_eq!(snapshot.owner_of(&registration.id), Some(*name));
    }

    for (_, registration) in &kept {
        service.unregister(&registration.id).unwrap();
    }
    assert!(service.list().is_empty());
    assert_eq!(service.instance_count(), 0);
}
