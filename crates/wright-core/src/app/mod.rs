//! # Wright Core Collaborators
//!
//! The interfaces of the objects the startup phases construct and wire
//! together, and stand-alone default implementations for the ones the
//! kernel creates itself.
//!
//! The manifest-declared collaborators (persistent store, entity class
//! registry, engine, property manager, binding components, security guard
//! chain) are only specified here as traits; their implementations come from
//! plugins. A constructor registered for one of these roles must produce an
//! [`Instance`](crate::kernel::component::Instance) holding the matching
//! `Arc<dyn Trait>`, e.g. `Instance::new(store as Arc<dyn PersistentStore>)`.
pub mod binding;
pub mod context;
pub mod engine;
pub mod messaging;
pub mod session;
pub mod transaction;

pub use binding::{BindingComponent, BindingComponentRegistry, BindingContext, SecurityGuardChain};
pub use context::{AppContext, LocalAppContext};
pub use engine::{AppEngine, EntityClassRegistry, EntityLifeCycle, PersistentStore, PropertyManager};
pub use messaging::{HttpMessageSender, HttpSmsSender, MessageSender, OutboundMessage, SmsSender};
pub use session::{
    InMemorySessionManager, SequentialUidGenerator, SessionListener, SessionManager, UidGenerator,
};
pub use transaction::{TransactionId, TransactionManager};

#[cfg(test)]
mod tests;
