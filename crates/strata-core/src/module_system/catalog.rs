use std::collections::HashMap;

use crate::kernel::error::Result;
use crate::module_system::descriptor::ModuleDescriptor;
use crate::module_system::error::ModuleSystemError;
use crate::module_system::module_type::ModuleType;
use crate::plugin_system::source::PluginSource;

/// Registry of every module type reached during one bootstrap run.
///
/// Holds exactly one [`ModuleDescriptor`] per type, in discovery order.
#[derive(Debug, Default)]
pub struct ModuleCatalog {
    descriptors: Vec<ModuleDescriptor>,
    index: HashMap<&'static str, usize>,
}

impl ModuleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover `root`, every plugin source's modules, and all of their
    /// transitive dependencies. Returns every known type in discovery order.
    ///
    /// Types reached more than once keep their first descriptor. Sources are
    /// queried in the order given.
    pub async fn discover_module_types(
        &mut self,
        root: &ModuleType,
        plugin_sources: &[Box<dyn PluginSource>],
    ) -> Result<Vec<ModuleType>> {
        self.add_module(root.clone())?;

        for source in plugin_sources {
            let module_types = source.get_modules().await?;
            log::debug!(
                "Plugin source {} provided {} module type(s)",
                source.describe(),
                module_types.len()
            );
            for module_type in module_types {
                self.add_module(module_type)?;
            }
        }

        Ok(self.module_types())
    }

    /// Add `module_type` and, depth-first, every dependency not yet known.
    pub fn add_module(&mut self, module_type: ModuleType) -> std::result::Result<(), ModuleSystemError> {
        if let Some(&position) = self.index.get(module_type.name()) {
            if module_type.package().is_dynamic() {
                self.descriptors[position].adopt_package(module_type.package().clone());
            }
            return Ok(());
        }

        if module_type.is_abstract() {
            return Err(ModuleSystemError::NotAModule {
                module: module_type.name().to_string(),
            });
        }

        let dependencies = attribute_to_parent_package(&module_type, module_type.dependencies());
        log::debug!(
            "Discovered module '{}' with {} dependenc(ies)",
            module_type.name(),
            dependencies.len()
        );

        self.index.insert(module_type.name(), self.descriptors.len());
        self.descriptors
            .push(ModuleDescriptor::new(module_type, dependencies.clone()));

        for dependency in dependencies {
            self.add_module(dependency)?;
        }
        Ok(())
    }

    pub fn contains(&self, module_type: &ModuleType) -> bool {
        self.index.contains_key(module_type.name())
    }

    pub fn get(&self, name: &str) -> Option<&ModuleDescriptor> {
        self.index.get(name).map(|&position| &self.descriptors[position])
    }

    pub fn descriptors(&self) -> &[ModuleDescriptor] {
        &self.descriptors
    }

    pub fn module_types(&self) -> Vec<ModuleType> {
        self.descriptors
            .iter()
            .map(|descriptor| descriptor.module_type().clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn into_descriptors(self) -> Vec<ModuleDescriptor> {
        self.descriptors
    }
}

/// Dependencies defined in the same crate as a runtime-loaded module live in
/// that module's library, so they share its package.
fn attribute_to_parent_package(parent: &ModuleType, dependencies: Vec<ModuleType>) -> Vec<ModuleType> {
    if !parent.package().is_dynamic() {
        return dependencies;
    }
    dependencies
        .into_iter()
        .map(|dependency| {
            if !dependency.package().is_dynamic() && dependency.crate_name() == parent.crate_name() {
                dependency.with_package(parent.package().clone())
            } else {
                dependency
            }
        })
        .collect()
}
