use crate::factory::error::AssemblyError;
use crate::factory::registry::TypeRegistry;
use crate::plugin_system::version::VersionRange;

/// A statically linked bundle of constructible types.
///
/// Plugins are how a host widens the closed type universe the
/// [`ComponentFactory`](crate::factory::ComponentFactory) resolves manifest
/// identifiers against.
pub trait Plugin: Send + Sync {
    /// The name of the plugin
    fn name(&self) -> &'static str;

    /// The version of the plugin
    fn version(&self) -> &str;

    /// Kernel API versions this plugin was built against
    fn compatible_api_versions(&self) -> Vec<VersionRange>;

    /// Add this plugin's type definitions to `types`.
    fn register_types(&self, types: &mut TypeRegistry) -> Result<(), AssemblyError>;
}
