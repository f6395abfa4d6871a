use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::module_system::module_type::{ModuleType, Package, push_unique};
use crate::module_system::traits::Module;

/// The catalog's record of one discovered module.
///
/// Fields drop in declaration order: the instance goes before the packages
/// whose code it runs.
pub struct ModuleDescriptor {
    instance: OnceLock<Arc<dyn Module>>,
    dependencies: Vec<ModuleType>,
    is_loaded: bool,
    module_type: ModuleType,
    all_packages: Vec<Package>,
}

impl ModuleDescriptor {
    pub(crate) fn new(module_type: ModuleType, dependencies: Vec<ModuleType>) -> Self {
        let mut unique: Vec<ModuleType> = Vec::with_capacity(dependencies.len());
        for dependency in dependencies {
            if !unique.contains(&dependency) {
                unique.push(dependency);
            }
        }

        let mut all_packages = vec![module_type.package().clone()];
        for package in module_type.additional_packages() {
            push_unique(&mut all_packages, package);
        }

        Self {
            instance: OnceLock::new(),
            dependencies: unique,
            is_loaded: false,
            module_type,
            all_packages,
        }
    }

    pub fn module_type(&self) -> &ModuleType {
        &self.module_type
    }

    pub fn name(&self) -> &'static str {
        self.module_type.name()
    }

    /// Declared dependencies, de-duplicated, in declaration order.
    pub fn dependencies(&self) -> &[ModuleType] {
        &self.dependencies
    }

    pub fn depends_on(&self, module_type: &ModuleType) -> bool {
        self.dependencies.contains(module_type)
    }

    /// The package defining the module, followed by its additional packages.
    pub fn all_packages(&self) -> &[Package] {
        &self.all_packages
    }

    pub fn instance(&self) -> Option<&Arc<dyn Module>> {
        self.instance.get()
    }

    pub fn is_activated(&self) -> bool {
        self.instance.get().is_some()
    }

    pub fn is_loaded(&self) -> bool {
        self.is_loaded
    }

    pub(crate) fn mark_loaded(&mut self) {
        self.is_loaded = true;
    }

    /// Store the instance. Returns the one already stored if there was one.
    pub(crate) fn set_instance(&self, instance: Arc<dyn Module>) -> Arc<dyn Module> {
        self.instance.get_or_init(|| instance).clone()
    }

    /// Attribute the module to a runtime-loaded package it was reported by.
    pub(crate) fn adopt_package(&mut self, package: Package) {
        if package.is_dynamic() && !self.module_type.package().is_dynamic() {
            self.module_type = self.module_type.clone().with_package(package.clone());
            self.all_packages[0] = package;
        } else {
            push_unique(&mut self.all_packages, package);
        }
    }

    pub(crate) fn release_instance(&mut self) {
        self.instance.take();
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("module_type", &self.module_type.name())
            .field(
                "dependencies",
                &self.dependencies.iter().map(ModuleType::name).collect::<Vec<_>>(),
            )
            .field("all_packages", &self.all_packages)
            .field("activated", &self.is_activated())
            .field("is_loaded", &self.is_loaded)
            .finish()
    }
}
