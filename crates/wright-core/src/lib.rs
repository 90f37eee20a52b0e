//! # Wright Core
//!
//! A configuration-driven object-graph assembly engine. A manifest names the
//! persistent store, entity registry, engine, binding components and
//! services of an application; [`AppServer`] builds them from a registry of
//! known types and wires them together in a fixed sequence of startup phases.
pub mod app;
pub mod factory;
pub mod kernel;
pub mod manifest;
pub mod plugin_system;
pub mod port;
pub mod service;
pub mod stage_manager;
pub mod storage;

// Re-export key public types/traits for easier use by the binary and plugins
pub use factory::{AssemblyError, ComponentFactory, TypeDefinition, TypeRegistry};
pub use kernel::error::Error as KernelError;
pub use kernel::{AppServer, AppState, Instance, ServerSettings, VariableRegistry};
pub use manifest::{ConfigModel, ManifestFormat};
pub use plugin_system::{Plugin, PluginRegistry, VersionRange};
pub use service::{AppService, ServiceManager};
pub use storage::StorageProvider;

#[cfg(test)]
mod tests;
