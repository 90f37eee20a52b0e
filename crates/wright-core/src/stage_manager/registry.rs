use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::kernel::error::{Error as KernelError, Result as KernelResult};
use crate::stage_manager::error::StageSystemError;
use crate::stage_manager::{Stage, StageContext, StageResult};

/// Registry for managing stages
pub struct StageRegistry {
    /// Registered stages by ID
    stages: HashMap<String, Box<dyn Stage>>,
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRegistry")
            .field("stages", &self.get_all_ids())
            .finish()
    }
}

impl StageRegistry {
    /// Create a new stage registry
    pub fn new() -> Self {
        Self {
            stages: HashMap::new(),
        }
    }

    /// Register a stage
    pub fn register_stage(&mut self, stage: Box<dyn Stage>) -> Result<(), StageSystemError> {
        let id = stage.id().to_string();

        if self.stages.contains_key(&id) {
            return Err(StageSystemError::StageAlreadyExists { stage_id: id });
        }

        self.stages.insert(id, stage);
        Ok(())
    }

    /// Check if a stage with the given ID exists
    pub fn has_stage(&self, id: &str) -> bool {
        self.stages.contains_key(id)
    }

    /// Get all registered stage IDs, sorted
    pub fn get_all_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.stages.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Get the number of registered stages
    pub fn count(&self) -> usize {
        self.stages.len()
    }

    /// Name and description of a stage
    pub fn stage_info(&self, id: &str) -> Option<(String, String)> {
        self.stages
            .get(id)
            .map(|stage| (stage.name().to_string(), stage.description().to_string()))
    }

    /// Execute a specific stage (internal method)
    pub async fn execute_stage_internal(
        &self,
        id: &str,
        context: &mut StageContext,
    ) -> Result<StageResult, StageSystemError> {
        let stage = self.stages.get(id).ok_or_else(|| StageSystemError::StageNotFound {
            stage_id: id.to_string(),
        })?;

        if context.is_dry_run() {
            if !stage.supports_dry_run() {
                return Ok(StageResult::Skipped(format!(
                    "{} does not support dry run",
                    stage.name()
                )));
            }
            let description = stage.dry_run_description(context);
            log::debug!("DRY RUN {}: {}", id, description);
            return Ok(StageResult::Planned(description));
        }

        log::info!("Executing stage: {} ({})", stage.name(), id);
        match stage.execute(context).await {
            Ok(()) => {
                log::debug!("Stage completed successfully: {}", id);
                Ok(StageResult::Success)
            }
            Err(source) => {
                log::error!("Stage failed: {} - {}", id, source);
                Err(StageSystemError::StageExecutionFailed {
                    stage_id: id.to_string(),
                    source: Box::new(source),
                })
            }
        }
    }
}

impl Default for StageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Thread-safe stage registry using Tokio's Mutex
#[derive(Clone, Debug)]
pub struct SharedStageRegistry {
    pub registry: Arc<Mutex<StageRegistry>>,
}

impl SharedStageRegistry {
    /// Create a new shared stage registry
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(StageRegistry::new())),
        }
    }

    /// Get a cloned reference to the registry Arc<Mutex>
    pub fn registry(&self) -> Arc<Mutex<StageRegistry>> {
        self.registry.clone()
    }

    /// Register a stage
    pub async fn register_stage(&self, stage: Box<dyn Stage>) -> KernelResult<()> {
        let mut registry = self.registry.lock().await;
        registry.register_stage(stage).map_err(KernelError::from)
    }

    /// Check if a stage exists
    pub async fn has_stage(&self, id: &str) -> bool {
        let registry = self.registry.lock().await;
        registry.has_stage(id)
    }

    /// Execute a specific stage
    pub async fn execute_stage(&self, id: &str, context: &mut StageContext) -> KernelResult<StageResult> {
        let registry = self.registry.lock().await;
        registry
            .execute_stage_internal(id, context)
            .await
            .map_err(KernelError::from)
    }

    /// Get all registered stage IDs
    pub async fn get_all_ids(&self) -> Vec<String> {
        let registry = self.registry.lock().await;
        registry.get_all_ids()
    }
}

impl Default for SharedStageRegistry {
    fn default() -> Self {
        Self::new()
    }
}
