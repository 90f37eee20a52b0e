//! # Wright Core Plugin System Errors
//!
//! [`PluginSystemError`] covers the ways a type-providing plugin can be
//! refused: duplicate names, API incompatibility, malformed versions, and
//! type registrations that collide with already known identifiers.
use crate::factory::error::AssemblyError;
use crate::plugin_system::version::VersionError;

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin already registered: {plugin_id}")]
    DuplicatePlugin { plugin_id: String },

    #[error("Plugin '{plugin_id}' is not compatible with API version {api_version}")]
    IncompatibleApiVersion {
        plugin_id: String,
        api_version: String,
    },

    #[error("Plugin registration error for '{plugin_id}': {source}")]
    RegistrationError {
        plugin_id: String,
        #[source]
        source: AssemblyError,
    },

    #[error("Version parsing error: {0}")]
    VersionParsing(#[from] VersionError),
}
