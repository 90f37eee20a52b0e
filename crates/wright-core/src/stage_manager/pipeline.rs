use crate::kernel::error::{Error, Result};
use crate::stage_manager::error::StageSystemError;
use crate::stage_manager::registry::SharedStageRegistry;
use crate::stage_manager::{StageContext, StageResult};

/// Represents a static definition of a pipeline.
/// Used for defining constant pipelines that can be easily referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDefinition {
    /// The unique identifier name for the pipeline.
    pub name: &'static str,
    /// An ordered slice of stage IDs included in this pipeline.
    pub stages: &'static [&'static str],
    /// An optional description of the pipeline's purpose.
    pub description: Option<&'static str>,
}

/// Ordered, fail-fast stage execution pipeline
#[derive(Debug, Clone)]
pub struct StagePipeline {
    /// Name of the pipeline
    name: String,
    /// Description of what this pipeline does
    description: String,
    /// Ordered list of stage IDs to execute
    stages: Vec<String>,
}

impl StagePipeline {
    /// Create a new stage pipeline
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            stages: Vec::new(),
        }
    }

    /// Build a pipeline from a static definition.
    pub fn from_definition(definition: &PipelineDefinition) -> Self {
        let mut pipeline = Self::new(definition.name, definition.description.unwrap_or_default());
        pipeline.add_stages(definition.stages);
        pipeline
    }

    /// Add a stage ID to the pipeline; duplicates are ignored
    pub fn add_stage(&mut self, stage_id: &str) {
        if !self.stages.iter().any(|s| s == stage_id) {
            self.stages.push(stage_id.to_string());
        }
    }

    /// Add multiple stage IDs to the pipeline
    pub fn add_stages(&mut self, stage_ids: &[&str]) {
        for stage_id in stage_ids {
            self.add_stage(stage_id);
        }
    }

    /// Check that every stage of the pipeline is registered
    pub async fn validate(&self, registry: &SharedStageRegistry) -> Result<()> {
        for stage_id in &self.stages {
            if !registry.has_stage(stage_id).await {
                return Err(Error::from(StageSystemError::StageNotFoundInPipelineValidation {
                    pipeline_name: self.name.clone(),
                    stage_id: stage_id.clone(),
                }));
            }
        }
        Ok(())
    }

    /// Execute the stages in order. The first failing stage aborts the run
    /// and its error is returned; later stages are not executed.
    pub async fn execute(
        &self,
        context: &mut StageContext,
        registry: &SharedStageRegistry,
    ) -> Result<Vec<(String, StageResult)>> {
        log::info!("Executing pipeline: {} ({})", self.name, self.description);
        self.validate(registry).await?;

        let mut results = Vec::with_capacity(self.stages.len());
        for stage_id in &self.stages {
            let result = registry.execute_stage(stage_id, context).await?;
            results.push((stage_id.clone(), result));
        }

        log::info!("Pipeline {} finished ({} stages)", self.name, results.len());
        Ok(results)
    }

    /// Get the name of the pipeline
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the description of the pipeline
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get the stages in the pipeline
    pub fn stages(&self) -> &[String] {
        &self.stages
    }
}
