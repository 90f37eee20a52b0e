use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::app::session::SessionListener;
use crate::factory::error::BoxError;

/// The persistence layer the engine stores entities in.
pub trait PersistentStore: Send + Sync + Debug {
    fn name(&self) -> &str;
}

/// Catalogue of the entity types an application knows about.
pub trait EntityClassRegistry: Send + Sync + Debug {
    fn entity_types(&self) -> Vec<String>;
}

/// Listener over entity lifecycle events.
pub trait EntityLifeCycle: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// The session-listener view of this listener, if it also observes
    /// sessions.
    fn as_session_listener(self: Arc<Self>) -> Option<Arc<dyn SessionListener>> {
        None
    }
}

/// The application engine.
///
/// Constructed with `(AppConfig, AppContext, PersistentStore, ServiceManager)`.
pub trait AppEngine: Send + Sync + Debug {
    fn name(&self) -> &str;

    /// Build the engine's entity lifecycle listeners.
    fn initialize_lifecycle_listeners(&self) -> Result<Vec<Arc<dyn EntityLifeCycle>>, BoxError>;
}

/// Supplier of runtime properties that override the manifest's.
pub trait PropertyManager: Send + Sync + Debug {
    fn set_app_engine(&self, engine: Arc<dyn AppEngine>);

    fn properties(&self) -> Result<BTreeMap<String, String>, BoxError>;
}
