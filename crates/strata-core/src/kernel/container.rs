use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

#[derive(Debug, thiserror::Error)]
pub enum ContainerError {
    #[error("No service registered for type '{type_name}'")]
    NotRegistered { type_name: String },

    #[error("Service registered for type '{type_name}' has a different concrete type")]
    TypeMismatch { type_name: String },
}

struct ServiceEntry {
    type_name: String,
    instance: Arc<dyn Any + Send + Sync>,
}

/// Type-keyed singleton registry shared by the module system and modules.
///
/// The activator writes one entry per module before any hook runs; modules
/// register their own services during the configure phases. Reads and writes
/// take `&self`, so the container can be shared behind an `Arc`.
#[derive(Default)]
pub struct ServiceContainer {
    services: DashMap<TypeId, ServiceEntry>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self {
            services: DashMap::new(),
        }
    }

    /// Register a shared instance, replacing any previous registration of `T`.
    pub fn register_singleton<T: Send + Sync + 'static>(&self, instance: Arc<T>) {
        self.insert_erased(TypeId::of::<T>(), type_name::<T>(), instance);
    }

    /// Register an owned value as a singleton.
    pub fn register<T: Send + Sync + 'static>(&self, instance: T) {
        self.register_singleton(Arc::new(instance));
    }

    pub(crate) fn insert_erased(
        &self,
        type_id: TypeId,
        type_name: &'static str,
        instance: Arc<dyn Any + Send + Sync>,
    ) {
        let entry = ServiceEntry {
            type_name: type_name.to_string(),
            instance,
        };
        if self.services.insert(type_id, entry).is_some() {
            log::debug!("Replaced service registration for '{}'", type_name);
        }
    }

    pub(crate) fn remove_erased(&self, type_id: TypeId) -> bool {
        self.services.remove(&type_id).is_some()
    }

    /// Resolve a registered service, failing if it is missing.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, ContainerError> {
        let entry = self
            .services
            .get(&TypeId::of::<T>())
            .ok_or_else(|| ContainerError::NotRegistered {
                type_name: type_name::<T>().to_string(),
            })?;
        entry
            .instance
            .clone()
            .downcast::<T>()
            .map_err(|_| ContainerError::TypeMismatch {
                type_name: type_name::<T>().to_string(),
            })
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.resolve::<T>().ok()
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Names of every registered type, sorted.
    pub fn registered_type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.services.iter().map(|entry| entry.type_name.clone()).collect();
        names.sort_unstable();
        names
    }

    /// Drop every registration.
    pub fn clear(&self) {
        self.services.clear();
    }
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("services", &self.registered_type_names())
            .finish()
    }
}
