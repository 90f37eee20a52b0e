use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::app::context::AppContext;
use crate::app::engine::{AppEngine, EntityClassRegistry};
use crate::app::session::SessionManager;
use crate::factory::error::BoxError;
use crate::manifest::ConfigModel;

/// Ordered access checks applied in front of binding components.
///
/// Constructed with the engine as its only argument.
pub trait SecurityGuardChain: Send + Sync + Debug {
    fn guards(&self) -> Vec<String>;
}

/// Everything a binding component is wired to.
#[derive(Debug, Clone)]
pub struct BindingContext {
    pub config: Arc<ConfigModel>,
    pub context: Arc<dyn AppContext>,
    pub engine: Arc<dyn AppEngine>,
    pub session_manager: Arc<dyn SessionManager>,
    pub security_guard_chain: Option<Arc<dyn SecurityGuardChain>>,
    pub entity_class_registry: Arc<dyn EntityClassRegistry>,
}

/// Adapter that exposes the engine to some outside protocol.
pub trait BindingComponent: Send + Sync + Debug {
    fn name(&self) -> &str;

    fn set_context(&self, context: BindingContext) -> Result<(), BoxError>;
}

/// Installed binding components, in installation order.
#[derive(Debug, Default)]
pub struct BindingComponentRegistry {
    components: RwLock<Vec<Arc<dyn BindingComponent>>>,
}

impl BindingComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, component: Arc<dyn BindingComponent>) {
        log::debug!("Installed binding component {}", component.name());
        self.components.write().push(component);
    }

    pub fn components(&self) -> Vec<Arc<dyn BindingComponent>> {
        self.components.read().clone()
    }

    pub fn len(&self) -> usize {
        self.components.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.read().is_empty()
    }
}
