use std::sync::Mutex;

use async_trait::async_trait;

use crate::kernel::error::Result;
use crate::module_system::module_type::ModuleType;
use crate::module_system::traits::ModuleDefinition;
use crate::plugin_system::error::PluginLoadWarning;

/// Provider of additional module types for discovery.
#[async_trait]
pub trait PluginSource: Send + Sync {
    /// Module types in load order. Hard failures abort discovery.
    async fn get_modules(&self) -> Result<Vec<ModuleType>>;

    /// Soft failures recorded by the most recent `get_modules` call.
    fn warnings(&self) -> Vec<PluginLoadWarning> {
        Vec::new()
    }

    /// Short label used in log output.
    fn describe(&self) -> String;
}

/// Statically linked module types offered through the plugin source interface.
#[derive(Debug, Default, Clone)]
pub struct TypeSource {
    module_types: Vec<ModuleType>,
}

impl TypeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<M: ModuleDefinition>(mut self) -> Self {
        self.module_types.push(ModuleType::of::<M>());
        self
    }

    pub fn add(&mut self, module_type: ModuleType) -> &mut Self {
        self.module_types.push(module_type);
        self
    }
}

#[async_trait]
impl PluginSource for TypeSource {
    async fn get_modules(&self) -> Result<Vec<ModuleType>> {
        Ok(self.module_types.clone())
    }

    fn describe(&self) -> String {
        format!("types({})", self.module_types.len())
    }
}

/// Warnings collected by a source while it loads packages.
#[derive(Debug, Default)]
pub(crate) struct WarningLog {
    warnings: Mutex<Vec<PluginLoadWarning>>,
}

impl WarningLog {
    pub(crate) fn reset(&self) {
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.clear();
        }
    }

    pub(crate) fn record(&self, warning: PluginLoadWarning) {
        log::warn!("Plugin load warning: {}", warning);
        if let Ok(mut warnings) = self.warnings.lock() {
            warnings.push(warning);
        }
    }

    pub(crate) fn snapshot(&self) -> Vec<PluginLoadWarning> {
        self.warnings
            .lock()
            .map(|warnings| warnings.clone())
            .unwrap_or_default()
    }
}
