use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::factory::error::AssemblyError;
use crate::service::AppService;

/// A constructed object, shared by reference.
///
/// Every value the factory produces or consumes is an `Instance`: an
/// `Arc<dyn Any>` around the concrete value (usually itself an
/// `Arc<dyn Trait>`), plus the name of the stored Rust type for diagnostics.
/// Cloning an `Instance` clones the handle, never the object.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
    service_hook: Option<Arc<dyn AppService>>,
}

impl Instance {
    /// Wrap a value. Trait objects should be wrapped as `Arc<dyn Trait>` so
    /// consumers can downcast to the same `Arc<dyn Trait>` type.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
            service_hook: None,
        }
    }

    /// Attach a start/stop hook, invoked when the instance is registered as a service.
    pub fn with_service_hook(mut self, hook: Arc<dyn AppService>) -> Self {
        self.service_hook = Some(hook);
        self
    }

    /// Clone the stored value out as `T`, if it is one.
    pub fn downcast<T: Any + Send + Sync + Clone>(&self) -> Option<T> {
        self.value.downcast_ref::<T>().cloned()
    }

    /// Borrow the stored value as `T`, if it is one.
    pub fn downcast_ref<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Whether the stored value is a `T`.
    pub fn is<T: Any + Send + Sync>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Rust type name of the stored value.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn service_hook(&self) -> Option<&Arc<dyn AppService>> {
        self.service_hook.as_ref()
    }

    /// Whether both handles point at the same stored value.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .field("service_hook", &self.service_hook.is_some())
            .finish()
    }
}

/// Read-only view of published variables, handed to the factory and the
/// service assembler.
pub trait VariableLookup {
    /// Resolve `key`. A missing key is an error, never a default.
    fn lookup(&self, key: &str) -> Result<Instance, AssemblyError>;
}

/// Name -> instance mapping populated as startup phases complete.
///
/// Keys mix two namespaces by convention: short aliases (`appConfig`) and
/// type identifiers (`wright::AppConfig`). The registry does not tell them
/// apart.
#[derive(Default, Debug, Clone)]
pub struct VariableRegistry {
    variables: HashMap<String, Instance>,
}

impl VariableRegistry {
    /// Create a new empty variable registry
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    /// Bind `key` to `value`, returning the previous binding. Last write wins.
    pub fn put(&mut self, key: impl Into<String>, value: Instance) -> Option<Instance> {
        self.variables.insert(key.into(), value)
    }

    /// Get the value bound to `key`.
    pub fn get(&self, key: &str) -> Result<Instance, AssemblyError> {
        self.variables
            .get(key)
            .cloned()
            .ok_or_else(|| AssemblyError::MissingDependencyVariable {
                key: key.to_string(),
            })
    }

    /// Get the value bound to `key`, downcast to `T`.
    pub fn get_as<T: Any + Send + Sync + Clone>(&self, key: &str) -> Result<T, AssemblyError> {
        self.get(key)?
            .downcast::<T>()
            .ok_or_else(|| AssemblyError::TypeMismatch {
                type_id: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    /// All bound keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.variables.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Clear all bindings.
    pub fn clear(&mut self) {
        self.variables.clear();
    }
}

impl VariableLookup for VariableRegistry {
    fn lookup(&self, key: &str) -> Result<Instance, AssemblyError> {
        self.get(key)
    }
}
