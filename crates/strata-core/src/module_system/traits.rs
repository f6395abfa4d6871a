use async_trait::async_trait;

use crate::kernel::container::ServiceContainer;
use crate::kernel::error::BoxError;
use crate::lifecycle::context::{
    ApplicationContext, ConfigureContext, PostConfigureContext, PreConfigureContext,
};
use crate::module_system::module_type::{ModuleType, Package};

/// Outcome of a single lifecycle hook
pub type HookResult = std::result::Result<(), BoxError>;

/// Lifecycle hooks of a loaded module.
///
/// Every hook defaults to a no-op. Hooks of one phase run for every module, in
/// dependency order, before any hook of the next phase starts; shutdown runs in
/// reverse order.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    /// Register deferred configuration and provisional items. Services are not
    /// reachable yet.
    async fn pre_configure(&self, _ctx: &mut PreConfigureContext<'_>) -> HookResult {
        Ok(())
    }

    /// Register services and build settings from deferred configuration.
    async fn configure(&self, _ctx: &mut ConfigureContext<'_>) -> HookResult {
        Ok(())
    }

    /// Inspect or adjust what other modules registered.
    async fn post_configure(&self, _ctx: &mut PostConfigureContext<'_>) -> HookResult {
        Ok(())
    }

    async fn pre_initialize(&self, _ctx: &ApplicationContext) -> HookResult {
        Ok(())
    }

    async fn initialize(&self, _ctx: &ApplicationContext) -> HookResult {
        Ok(())
    }

    async fn post_initialize(&self, _ctx: &ApplicationContext) -> HookResult {
        Ok(())
    }

    async fn shutdown(&self, _ctx: &ApplicationContext) -> HookResult {
        Ok(())
    }
}

/// Static declaration of a module type: what it depends on and how it is built.
///
/// ```ignore
/// struct CacheModule;
///
/// impl Module for CacheModule {}
///
/// impl ModuleDefinition for CacheModule {
///     fn dependencies() -> Vec<ModuleType> {
///         vec![ModuleType::of::<StorageModule>()]
///     }
///
///     fn create(_services: &ServiceContainer) -> Result<Self, BoxError> {
///         Ok(CacheModule)
///     }
/// }
/// ```
pub trait ModuleDefinition: Module + Sized {
    /// Abstract definitions are shared bases that fail discovery if reached
    /// directly, and are skipped when a package lists them.
    const ABSTRACT: bool = false;

    /// Modules that must be configured and initialized before this one, in order.
    fn dependencies() -> Vec<ModuleType> {
        Vec::new()
    }

    /// Extra packages this module spans besides the one it is defined in.
    fn additional_packages() -> Vec<Package> {
        Vec::new()
    }

    /// Construct the module. Services registered before activation can be resolved.
    fn create(services: &ServiceContainer) -> Result<Self, BoxError>;
}
