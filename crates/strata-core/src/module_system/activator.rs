use std::sync::Arc;

use crate::kernel::container::ServiceContainer;
use crate::module_system::descriptor::ModuleDescriptor;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::traits::Module;

/// Creates module instances and publishes them in the service container.
pub struct ModuleActivator;

impl ModuleActivator {
    /// Create the descriptor's module once and register it under its concrete type.
    ///
    /// A descriptor that already holds an instance returns it unchanged.
    pub fn create_and_register(
        services: &ServiceContainer,
        descriptor: &ModuleDescriptor,
    ) -> Result<Arc<dyn Module>, ModuleSystemError> {
        if let Some(existing) = descriptor.instance() {
            return Ok(existing.clone());
        }

        let module_type = descriptor.module_type();
        let instance = module_type
            .instantiate(services)
            .map_err(|source| ModuleSystemError::ActivationFailed {
                module: module_type.name().to_string(),
                source,
            })?;

        services.insert_erased(module_type.type_id(), module_type.name(), instance.service);
        log::debug!("Activated module '{}'", module_type.name());
        Ok(descriptor.set_instance(instance.hooks))
    }

    /// Activate every descriptor in order, stopping at the first failure.
    pub fn activate_all(
        services: &ServiceContainer,
        descriptors: &[ModuleDescriptor],
    ) -> Result<(), ModuleSystemError> {
        for descriptor in descriptors {
            Self::create_and_register(services, descriptor)?;
        }
        Ok(())
    }
}
