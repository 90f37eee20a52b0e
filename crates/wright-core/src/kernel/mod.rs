//! # Wright Core Kernel
//!
//! The `kernel` module owns the startup of an application: it holds the
//! collaborators the startup phases share and drives the phases in order.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Bootstrapping**: [`AppServer`](bootstrap::AppServer) runs the startup
//!   pipeline and tracks the resulting [`AppState`](bootstrap::AppState).
//! - **Variables and instances**: [`Instance`](component::Instance) is the
//!   shared handle every constructed object travels in;
//!   [`VariableRegistry`](component::VariableRegistry) is the named pool the
//!   factory resolves dependencies from.
//! - **Settings**: host-level [`ServerSettings`](settings::ServerSettings).
//! - **Core Constants**: well-known type identifiers, aliases and property keys.
//! - **Error Handling**: the aggregating [`Error`](error::Error) and a
//!   `Result` alias.
pub mod bootstrap;
pub mod component;
pub mod constants;
pub mod error;
pub mod settings;

pub use bootstrap::{AppServer, AppState};
pub use component::{Instance, VariableLookup, VariableRegistry};
pub use error::{Error, KernelLifecyclePhase, Result};
pub use settings::ServerSettings;

// Test module declaration
#[cfg(test)]
mod tests;
