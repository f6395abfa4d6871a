use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};

use crate::kernel::constants::{API_VERSION, PACKAGE_DECLARATION_SYMBOL};
use crate::module_system::module_type::{ModuleType, Package};
use crate::module_system::traits::ModuleDefinition;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::version::is_api_compatible;

/// Static every plugin package exports under `STRATA_PACKAGE_DECLARATION`.
///
/// Packages must be built with the same compiler as the host; the declaration
/// carries Rust types across the library boundary.
#[repr(C)]
pub struct PackageDeclaration {
    /// Module API version the package was compiled against
    pub api_version: &'static str,
    /// Lists the package's module types
    pub register: fn(&mut ModuleRegistrar),
}

/// Collects the module types a package registers.
#[derive(Default)]
pub struct ModuleRegistrar {
    module_types: Vec<ModuleType>,
}

impl ModuleRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M: ModuleDefinition>(&mut self) -> &mut Self {
        self.module_types.push(ModuleType::of::<M>());
        self
    }

    pub fn module_types(&self) -> &[ModuleType] {
        &self.module_types
    }

    pub fn into_module_types(self) -> Vec<ModuleType> {
        self.module_types
    }
}

/// Export a package declaration listing the given module types, in order.
///
/// ```ignore
/// strata_core::export_modules!(GreetingModule, AuditModule);
/// ```
#[macro_export]
macro_rules! export_modules {
    ($($module:ty),+ $(,)?) => {
        #[doc(hidden)]
        #[unsafe(no_mangle)]
        pub static STRATA_PACKAGE_DECLARATION: $crate::plugin_system::loader::PackageDeclaration =
            $crate::plugin_system::loader::PackageDeclaration {
                api_version: $crate::kernel::constants::API_VERSION,
                register: {
                    fn register_modules(registrar: &mut $crate::plugin_system::loader::ModuleRegistrar) {
                        $( registrar.register::<$module>(); )+
                    }
                    register_modules
                },
            };
    };
}

/// A mapped plugin library and the module types it declared.
pub struct LoadedPackage {
    name: String,
    path: PathBuf,
    api_version: String,
    module_types: Vec<ModuleType>,
    // Dropped last: everything above may point into the library.
    library: Library,
}

impl LoadedPackage {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Non-abstract module types in registration order, attributed to this package.
    pub fn module_types(self: &Arc<Self>) -> Vec<ModuleType> {
        self.module_types
            .iter()
            .map(|module_type| module_type.clone().with_package(Package::Dynamic(self.clone())))
            .collect()
    }

    pub fn library(&self) -> &Library {
        &self.library
    }
}

impl fmt::Debug for LoadedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedPackage")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("api_version", &self.api_version)
            .field(
                "module_types",
                &self.module_types.iter().map(ModuleType::name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic reason".to_string()
    }
}

/// Package name from its file name: `libfoo.so` and `foo.dll` both give `foo`.
fn package_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_prefix("lib") {
        Some(stripped) if !stripped.is_empty() && !cfg!(windows) => stripped.to_string(),
        _ => stem,
    }
}

/// Maps package libraries and reads their declarations.
pub struct PackageLoader;

impl PackageLoader {
    /// Load the package at `path`. Every failure names the path.
    pub async fn load(path: impl AsRef<Path>) -> Result<Arc<LoadedPackage>, PluginSystemError> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| PluginSystemError::LoadingError {
                path: path.to_path_buf(),
                message: "package file not found".to_string(),
                source: Some(Box::new(e)),
            })?;
        if !metadata.is_file() {
            return Err(PluginSystemError::loading(path, "package path is not a file"));
        }
        Self::load_sync(path)
    }

    fn load_sync(path: &Path) -> Result<Arc<LoadedPackage>, PluginSystemError> {
        let library = unsafe { Library::new(path) }.map_err(|e| PluginSystemError::LoadingError {
            path: path.to_path_buf(),
            message: "failed to load library".to_string(),
            source: Some(Box::new(e)),
        })?;

        let (api_version, register) = {
            let symbol: Symbol<*const PackageDeclaration> = unsafe { library.get(PACKAGE_DECLARATION_SYMBOL) }
                .map_err(|e| PluginSystemError::LoadingError {
                    path: path.to_path_buf(),
                    message: "library does not export a package declaration".to_string(),
                    source: Some(Box::new(e)),
                })?;
            let declaration_ptr: *const PackageDeclaration = *symbol;
            if declaration_ptr.is_null() {
                return Err(PluginSystemError::loading(path, "package declaration is null"));
            }
            let declaration = unsafe { &*declaration_ptr };
            (declaration.api_version.to_string(), declaration.register)
        };

        let compatible = is_api_compatible(&api_version, API_VERSION).map_err(|e| {
            PluginSystemError::LoadingError {
                path: path.to_path_buf(),
                message: "package declares an unreadable API version".to_string(),
                source: Some(Box::new(e)),
            }
        })?;
        if !compatible {
            return Err(PluginSystemError::IncompatibleApiVersion {
                path: path.to_path_buf(),
                plugin_api: api_version,
                host_api: API_VERSION.to_string(),
            });
        }

        let mut registrar = ModuleRegistrar::new();
        panic::catch_unwind(AssertUnwindSafe(|| register(&mut registrar))).map_err(|payload| {
            PluginSystemError::loading(
                path,
                format!("package registration panicked: {}", panic_message(payload.as_ref())),
            )
        })?;

        let (module_types, skipped): (Vec<ModuleType>, Vec<ModuleType>) = registrar
            .into_module_types()
            .into_iter()
            .partition(|module_type| !module_type.is_abstract());
        for module_type in &skipped {
            log::debug!(
                "Skipping abstract module type '{}' in package {}",
                module_type.name(),
                path.display()
            );
        }

        let package = LoadedPackage {
            name: package_name(path),
            path: path.to_path_buf(),
            api_version,
            module_types,
            library,
        };
        log::info!(
            "Loaded package '{}' from {} with {} module type(s)",
            package.name,
            path.display(),
            package.module_types.len()
        );
        Ok(Arc::new(package))
    }
}
