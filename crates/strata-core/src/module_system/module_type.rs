use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::kernel::container::ServiceContainer;
use crate::kernel::error::BoxError;
use crate::module_system::traits::{Module, ModuleDefinition};
use crate::plugin_system::loader::LoadedPackage;

/// Code package a module type was found in.
#[derive(Clone)]
pub enum Package {
    /// Linked into the host; carries the crate name.
    Static(&'static str),
    /// Loaded at runtime. Holding this keeps the library mapped.
    Dynamic(Arc<LoadedPackage>),
}

impl Package {
    pub fn name(&self) -> &str {
        match self {
            Package::Static(name) => name,
            Package::Dynamic(package) => package.name(),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Package::Dynamic(_))
    }

    fn same_as(&self, other: &Package) -> bool {
        match (self, other) {
            (Package::Static(a), Package::Static(b)) => a == b,
            (Package::Dynamic(a), Package::Dynamic(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Package::Static(name) => f.debug_tuple("Static").field(name).finish(),
            Package::Dynamic(package) => f
                .debug_tuple("Dynamic")
                .field(&package.path().display())
                .finish(),
        }
    }
}

/// Push `package` onto `packages` unless it is already present.
pub(crate) fn push_unique(packages: &mut Vec<Package>, package: Package) {
    if !packages.iter().any(|known| known.same_as(&package)) {
        packages.push(package);
    }
}

/// A freshly created module, viewed both as hooks and as a service.
pub(crate) struct ModuleInstance {
    pub(crate) hooks: Arc<dyn Module>,
    pub(crate) service: Arc<dyn Any + Send + Sync>,
}

type Factory = fn(&ServiceContainer) -> Result<ModuleInstance, BoxError>;

fn instantiate<M: ModuleDefinition>(services: &ServiceContainer) -> Result<ModuleInstance, BoxError> {
    let module = Arc::new(M::create(services)?);
    Ok(ModuleInstance {
        hooks: module.clone(),
        service: module,
    })
}

/// Identity of a module definition.
///
/// Two `ModuleType`s are equal when they name the same Rust type path, which
/// stays stable across separately compiled plugin packages.
#[derive(Clone)]
pub struct ModuleType {
    name: &'static str,
    type_id: TypeId,
    is_abstract: bool,
    dependencies: fn() -> Vec<ModuleType>,
    additional_packages: fn() -> Vec<Package>,
    factory: Factory,
    package: Package,
}

impl ModuleType {
    pub fn of<M: ModuleDefinition>() -> Self {
        let name = type_name::<M>();
        Self {
            name,
            type_id: TypeId::of::<M>(),
            is_abstract: M::ABSTRACT,
            dependencies: M::dependencies,
            additional_packages: M::additional_packages,
            factory: instantiate::<M>,
            package: Package::Static(crate_of(name)),
        }
    }

    /// The same type, attributed to another package.
    pub fn with_package(mut self, package: Package) -> Self {
        self.package = package;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The path segment after the last `::`.
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }

    /// Crate the type is defined in.
    pub fn crate_name(&self) -> &'static str {
        crate_of(self.name)
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn dependencies(&self) -> Vec<ModuleType> {
        (self.dependencies)()
    }

    pub fn additional_packages(&self) -> Vec<Package> {
        (self.additional_packages)()
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    pub(crate) fn instantiate(&self, services: &ServiceContainer) -> Result<ModuleInstance, BoxError> {
        (self.factory)(services)
    }
}

fn crate_of(type_path: &'static str) -> &'static str {
    type_path.split("::").next().unwrap_or(type_path)
}

impl PartialEq for ModuleType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ModuleType {}

impl Hash for ModuleType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleType")
            .field("name", &self.name)
            .field("package", &self.package)
            .finish()
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
