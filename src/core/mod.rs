pub mod identity;
pub mod port_allocator;
pub mod registry;
pub mod store;

pub use crate::domain::model::{Instance, InstanceEntry, Registration, RegistrySnapshot};
pub use crate::domain::ports::{IdGenerator, PortSource};
pub use crate::utils::error::Result;
