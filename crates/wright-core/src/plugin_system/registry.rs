use std::sync::Arc;

use semver::Version;

use crate::factory::registry::TypeRegistry;
use crate::kernel::constants;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::Plugin;
use crate::plugin_system::version::parse_version;

/// Ordered set of type-providing plugins.
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn Plugin>>,
    api_version: Version,
}

impl PluginRegistry {
    /// Create a new plugin registry checking against `api_version`
    pub fn new(api_version: Version) -> Self {
        Self {
            plugins: Vec::new(),
            api_version,
        }
    }

    /// Registry for the API version this kernel implements.
    pub fn for_current_api() -> Result<Self, PluginSystemError> {
        Ok(Self::new(parse_version(constants::API_VERSION)?))
    }

    pub fn api_version(&self) -> &Version {
        &self.api_version
    }

    /// Register a plugin
    pub fn register_plugin(&mut self, plugin: Box<dyn Plugin>) -> Result<(), PluginSystemError> {
        let name = plugin.name().to_string();

        if self.has_plugin(&name) {
            return Err(PluginSystemError::DuplicatePlugin { plugin_id: name });
        }

        let compatible = plugin
            .compatible_api_versions()
            .iter()
            .any(|range| range.includes(&self.api_version));
        if !compatible {
            return Err(PluginSystemError::IncompatibleApiVersion {
                plugin_id: name,
                api_version: self.api_version.to_string(),
            });
        }

        log::info!("Registered plugin {} v{}", name, plugin.version());
        self.plugins.push(Arc::from(plugin));
        Ok(())
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|p| p.name() == name)
    }

    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.plugins.iter().find(|p| p.name() == name).cloned()
    }

    /// Plugin names in registration order
    pub fn plugin_names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Let every plugin, in registration order, add its types to `types`.
    pub fn install_all(&self, types: &mut TypeRegistry) -> Result<(), PluginSystemError> {
        for plugin in &self.plugins {
            let before = types.count();
            plugin
                .register_types(types)
                .map_err(|source| PluginSystemError::RegistrationError {
                    plugin_id: plugin.name().to_string(),
                    source,
                })?;
            log::debug!(
                "Plugin {} contributed {} type(s)",
                plugin.name(),
                types.count() - before
            );
        }
        Ok(())
    }

    /// Convenience: a fresh type registry holding every plugin's types.
    pub fn build_type_registry(&self) -> Result<TypeRegistry, PluginSystemError> {
        let mut types = TypeRegistry::new();
        self.install_all(&mut types)?;
        Ok(types)
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugin_names())
            .field("api_version", &self.api_version)
            .finish()
    }
}
