use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::ConfigData;
use crate::kernel::container::ServiceContainer;
use crate::kernel::error::Result;
use crate::lifecycle::{
    ApplicationContext, ConfigurationContext, LifecycleOrchestrator, LifecycleState,
};
use crate::module_system::graph;
use crate::module_system::module_type::Package;
use crate::module_system::{ModuleActivator, ModuleCatalog, ModuleDescriptor, ModuleDefinition, ModuleType};
use crate::plugin_system::error::PluginLoadWarning;
use crate::plugin_system::loader::LoadedPackage;
use crate::plugin_system::source::PluginSource;

/// Collects the inputs of a bootstrap run.
pub struct ApplicationBuilder {
    root: ModuleType,
    plugin_sources: Vec<Box<dyn PluginSource>>,
    configuration: ConfigData,
    cancellation: CancellationToken,
    services: Option<Arc<ServiceContainer>>,
}

impl ApplicationBuilder {
    pub fn new(root: ModuleType) -> Self {
        Self {
            root,
            plugin_sources: Vec::new(),
            configuration: ConfigData::new(),
            cancellation: CancellationToken::new(),
            services: None,
        }
    }

    /// Add a plugin source. Sources are queried in the order added.
    pub fn plugin_source(mut self, source: impl PluginSource + 'static) -> Self {
        self.plugin_sources.push(Box::new(source));
        self
    }

    pub fn configuration(mut self, configuration: ConfigData) -> Self {
        self.configuration = configuration;
        self
    }

    /// Container to activate modules into. Services already registered are
    /// visible to module factories. It is cleared when the application drops.
    pub fn services(mut self, services: Arc<ServiceContainer>) -> Self {
        self.services = Some(services);
        self
    }

    /// Token that aborts every lifecycle phase, shutdown included, when cancelled.
    pub fn cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Discover, order and activate every module.
    ///
    /// No lifecycle hook has run when this returns.
    pub async fn build(self) -> Result<Application> {
        log::info!("Bootstrapping application from root module '{}'", self.root.name());

        let mut catalog = ModuleCatalog::new();
        catalog
            .discover_module_types(&self.root, &self.plugin_sources)
            .await?;

        let warnings: Vec<PluginLoadWarning> = self
            .plugin_sources
            .iter()
            .flat_map(|source| source.warnings())
            .collect();

        let mut modules = graph::build_and_sort(catalog.into_descriptors(), &self.root)?;

        let services = self.services.unwrap_or_default();
        if let Err(err) = ModuleActivator::activate_all(&services, &modules) {
            release_activated(&services, &mut modules);
            return Err(err.into());
        }

        log::info!("Loaded {} module(s):", modules.len());
        for module in &modules {
            if module.dependencies().is_empty() {
                log::info!("  {}", module.name());
            } else {
                log::info!(
                    "  {} (depends on: {})",
                    module.name(),
                    module
                        .dependencies()
                        .iter()
                        .map(ModuleType::short_name)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            }
        }
        if !warnings.is_empty() {
            log::warn!("{} plugin package(s) were skipped during discovery", warnings.len());
        }

        let mut packages: Vec<Arc<LoadedPackage>> = Vec::new();
        for package in modules.iter().flat_map(|module| module.all_packages()) {
            if let Package::Dynamic(loaded) = package {
                if !packages.iter().any(|known| Arc::ptr_eq(known, loaded)) {
                    packages.push(loaded.clone());
                }
            }
        }

        let configuration = Arc::new(self.configuration);
        Ok(Application {
            config_context: ConfigurationContext::new(
                services.clone(),
                configuration.clone(),
                self.cancellation.clone(),
            ),
            app_context: ApplicationContext::new(services.clone(), configuration, self.cancellation),
            services,
            orchestrator: LifecycleOrchestrator::new(),
            warnings,
            modules,
            packages,
        })
    }
}

/// Undo a partial activation while the packages in `modules` are still mapped.
fn release_activated(services: &ServiceContainer, modules: &mut [ModuleDescriptor]) {
    for module in modules.iter_mut().filter(|module| module.is_activated()) {
        services.remove_erased(module.module_type().type_id());
        module.release_instance();
    }
}

/// One bootstrap run: the loaded modules in dependency order and the
/// registries they share.
///
/// Fields drop in declaration order, so everything that may hold plugin code
/// is released before the packages that map it.
pub struct Application {
    config_context: ConfigurationContext,
    app_context: ApplicationContext,
    services: Arc<ServiceContainer>,
    orchestrator: LifecycleOrchestrator,
    warnings: Vec<PluginLoadWarning>,
    modules: Vec<ModuleDescriptor>,
    packages: Vec<Arc<LoadedPackage>>,
}

impl Application {
    /// Start building an application rooted at `M`.
    pub fn builder<M: ModuleDefinition>() -> ApplicationBuilder {
        ApplicationBuilder::new(ModuleType::of::<M>())
    }

    /// Run PreConfigure, Configure and PostConfigure across all modules.
    pub async fn configure(&mut self) -> Result<()> {
        self.orchestrator
            .run_configuration_phases(&self.modules, &mut self.config_context)
            .await?;
        Ok(())
    }

    /// Run PreInitialize, Initialize and PostInitialize across all modules.
    pub async fn initialize(&mut self) -> Result<()> {
        self.orchestrator
            .run_initialization_phases(&self.modules, &self.app_context)
            .await?;
        log::info!("Application ready with {} module(s)", self.modules.len());
        Ok(())
    }

    /// Configure then initialize.
    pub async fn start(&mut self) -> Result<()> {
        self.configure().await?;
        self.initialize().await
    }

    /// Run every shutdown hook in reverse load order.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.orchestrator
            .shutdown(&self.modules, &self.app_context)
            .await?;
        log::info!("Application stopped");
        Ok(())
    }

    pub fn state(&self) -> LifecycleState {
        self.orchestrator.state()
    }

    pub fn services(&self) -> &Arc<ServiceContainer> {
        &self.services
    }

    pub fn context(&self) -> &ApplicationContext {
        &self.app_context
    }

    pub fn configuration_context(&self) -> &ConfigurationContext {
        &self.config_context
    }

    /// Loaded modules in dependency order.
    pub fn modules(&self) -> &[ModuleDescriptor] {
        &self.modules
    }

    pub fn module_names(&self) -> Vec<&'static str> {
        self.modules.iter().map(ModuleDescriptor::name).collect()
    }

    /// The activated instance of module `M`.
    pub fn module<M: ModuleDefinition>(&self) -> Option<Arc<M>> {
        self.services.get::<M>()
    }

    /// Packages skipped during discovery.
    pub fn plugin_warnings(&self) -> &[PluginLoadWarning] {
        &self.warnings
    }

    /// Runtime-loaded packages backing at least one module.
    pub fn packages(&self) -> &[Arc<LoadedPackage>] {
        &self.packages
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        self.app_context.cancellation_token()
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        // Module instances run package code when dropped.
        self.services.clear();
        for module in &mut self.modules {
            module.release_instance();
        }
    }
}
