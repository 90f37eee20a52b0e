//! # Wright Core Plugin System
//!
//! Plugins extend the set of types the component factory can build. There is
//! no dynamic loading: a host links its plugins, registers them with a
//! [`PluginRegistry`], and has the registry install their type definitions
//! into a [`TypeRegistry`](crate::factory::TypeRegistry) before the server
//! starts.
//!
//! - **[`traits`]**: the [`Plugin`] trait.
//! - **[`registry`]**: [`PluginRegistry`], which refuses duplicates and
//!   plugins built for another kernel API version.
//! - **[`version`]**: semver constraint parsing ([`VersionRange`]).
//! - **[`error`]**: [`PluginSystemError`].
pub mod error;
pub mod registry;
pub mod traits;
pub mod version;

pub use error::PluginSystemError;
pub use registry::PluginRegistry;
pub use traits::Plugin;
pub use version::{VersionError, VersionRange};
