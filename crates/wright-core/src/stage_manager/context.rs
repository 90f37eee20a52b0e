use std::any::{Any, type_name};
use std::collections::HashMap;

use crate::kernel::component::VariableRegistry;
use crate::stage_manager::error::StageSystemError;

/// Execution mode for stages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Live mode - actually execute operations
    Live,
    /// Dry run mode - simulate operations without executing them
    DryRun,
}

impl ExecutionMode {
    /// Check if this is dry run mode
    pub fn is_dry_run(&self) -> bool {
        matches!(self, ExecutionMode::DryRun)
    }
}

/// Context provided to stages during execution
///
/// Holds the values stages hand to each other (`shared_data`) and the
/// variable registry the factory resolves implicit dependencies from.
pub struct StageContext {
    /// The execution mode
    pub mode: ExecutionMode,

    /// Shared data between stages
    shared_data: HashMap<String, Box<dyn Any + Send + Sync>>,

    /// Published variables
    variables: VariableRegistry,
}

impl StageContext {
    /// Create a new context in live mode
    pub fn new_live() -> Self {
        Self::with_mode(ExecutionMode::Live)
    }

    /// Create a new context in dry run mode
    pub fn new_dry_run() -> Self {
        Self::with_mode(ExecutionMode::DryRun)
    }

    fn with_mode(mode: ExecutionMode) -> Self {
        Self {
            mode,
            shared_data: HashMap::new(),
            variables: VariableRegistry::new(),
        }
    }

    /// Set a shared data value
    pub fn set_data<T: 'static + Send + Sync>(&mut self, key: &str, value: T) {
        self.shared_data.insert(key.to_string(), Box::new(value));
    }

    /// Get a shared data value
    pub fn get_data<T: 'static + Send + Sync>(&self, key: &str) -> Option<&T> {
        self.shared_data.get(key).and_then(|data| data.downcast_ref::<T>())
    }

    /// Get a mutable reference to a shared data value
    pub fn get_data_mut<T: 'static + Send + Sync>(&mut self, key: &str) -> Option<&mut T> {
        self.shared_data.get_mut(key).and_then(|data| data.downcast_mut::<T>())
    }

    pub fn has_data(&self, key: &str) -> bool {
        self.shared_data.contains_key(key)
    }

    /// Clone out a shared value that an earlier stage must have set.
    pub fn require<T: 'static + Send + Sync + Clone>(&self, key: &str) -> Result<T, StageSystemError> {
        match self.shared_data.get(key) {
            None => Err(StageSystemError::ContextError {
                key: key.to_string(),
                reason: "not set by an earlier stage".to_string(),
            }),
            Some(data) => data.downcast_ref::<T>().cloned().ok_or_else(|| {
                StageSystemError::ContextError {
                    key: key.to_string(),
                    reason: format!("value is not a {}", type_name::<T>()),
                }
            }),
        }
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    pub fn variables_mut(&mut self) -> &mut VariableRegistry {
        &mut self.variables
    }

    /// Consume the context, keeping only the published variables.
    pub fn into_variables(self) -> VariableRegistry {
        self.variables
    }

    /// Check if dry run mode is active
    pub fn is_dry_run(&self) -> bool {
        self.mode.is_dry_run()
    }
}
