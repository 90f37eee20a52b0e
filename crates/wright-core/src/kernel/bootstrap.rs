use std::fmt;
use std::sync::Arc;

use crate::app::{AppContext, BindingComponentRegistry, SessionManager, TransactionManager};
use crate::factory::{ComponentFactory, TypeRegistry};
use crate::kernel::component::VariableRegistry;
use crate::kernel::constants;
use crate::kernel::error::{Error, KernelLifecyclePhase, Result};
use crate::kernel::settings::ServerSettings;
use crate::manifest::{ConfigModel, ManifestParser, SerdeManifestParser};
use crate::service::{AppServiceManager, AssemblyReport, ServiceManager};
use crate::stage_manager::core_stages::{self, STARTUP_PIPELINE};
use crate::stage_manager::{
    SharedStageRegistry, StageContext, StagePipeline, StageResult, StageSystemError,
};

/// Lifecycle state of an [`AppServer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Built, `init` not called yet
    Created,
    /// The startup pipeline is running
    Initing,
    /// Every startup phase succeeded
    Running,
    /// A startup phase failed; nothing after it ran
    Aborted { stage_id: Option<String> },
    /// Services were stopped
    Stopped,
}

impl fmt::Display for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppState::Created => write!(f, "created"),
            AppState::Initing => write!(f, "initing"),
            AppState::Running => write!(f, "running"),
            AppState::Aborted { stage_id: Some(id) } => write!(f, "aborted at {}", id),
            AppState::Aborted { stage_id: None } => write!(f, "aborted"),
            AppState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Assembles and owns one application's object graph.
///
/// The server holds everything the startup phases share: the context
/// collaborator, the component factory, the service registry, the
/// transaction manager and the installed binding components. `init` runs the
/// [`STARTUP_PIPELINE`] once; after it succeeds the published variables are
/// frozen and can be read concurrently through [`AppServer::variables`].
pub struct AppServer {
    app_context: Arc<dyn AppContext>,
    factory: Arc<ComponentFactory>,
    settings: ServerSettings,
    manifest_parser: Option<Arc<dyn ManifestParser>>,
    service_manager: Arc<dyn ServiceManager>,
    session_manager: Option<Arc<dyn SessionManager>>,
    transaction_manager: Arc<TransactionManager>,
    binding_components: Arc<BindingComponentRegistry>,
    stage_registry: SharedStageRegistry,
    state: AppState,
    config: Option<Arc<ConfigModel>>,
    variables: Option<Arc<VariableRegistry>>,
    assembly_report: Option<AssemblyReport>,
}

impl AppServer {
    /// Creates a server that builds components from `types`.
    pub fn new(app_context: Arc<dyn AppContext>, types: TypeRegistry) -> Self {
        log::debug!(
            "Creating {} v{} server for {} ({} type(s) known)",
            constants::APP_NAME,
            constants::APP_VERSION,
            app_context.application_root(),
            types.count()
        );
        Self {
            app_context,
            factory: Arc::new(ComponentFactory::new(types)),
            settings: ServerSettings::default(),
            manifest_parser: None,
            service_manager: Arc::new(AppServiceManager::new()),
            session_manager: None,
            transaction_manager: Arc::new(TransactionManager::new()),
            binding_components: Arc::new(BindingComponentRegistry::new()),
            stage_registry: SharedStageRegistry::new(),
            state: AppState::Created,
            config: None,
            variables: None,
            assembly_report: None,
        }
    }

    pub fn with_settings(mut self, settings: ServerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replace the default [`AppServiceManager`].
    pub fn with_service_manager(mut self, service_manager: Arc<dyn ServiceManager>) -> Self {
        self.service_manager = service_manager;
        self
    }

    /// Use `session_manager` instead of the in-memory one pre-init creates.
    pub fn with_session_manager(mut self, session_manager: Arc<dyn SessionManager>) -> Self {
        self.session_manager = Some(session_manager);
        self
    }

    /// Parse the manifest with `parser` instead of the serde parser for the
    /// configured format.
    pub fn with_manifest_parser(mut self, parser: Arc<dyn ManifestParser>) -> Self {
        self.manifest_parser = Some(parser);
        self
    }

    /// Run every startup phase in order.
    ///
    /// The first failing phase aborts startup. The returned error is a
    /// [`Error::KernelLifecycleError`] naming the failed stage, with the
    /// phase's error as its source.
    pub async fn init(&mut self) -> Result<()> {
        if self.state != AppState::Created {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::RunPreCheck,
                stage_id: None,
                message: format!("Server cannot be initialized while {}", self.state),
                source: None,
            });
        }

        log::info!(
            "Initializing {} v{} at {}",
            constants::APP_NAME,
            constants::APP_VERSION,
            self.app_context.application_root()
        );
        self.state = AppState::Initing;

        if let Err(e) = self.ensure_core_stages().await {
            self.state = AppState::Aborted { stage_id: None };
            return Err(e);
        }

        let mut context = self.seed_context(StageContext::new_live());
        let pipeline = StagePipeline::from_definition(&STARTUP_PIPELINE);
        let outcome = pipeline.execute(&mut context, &self.stage_registry).await;
        self.config = context
            .get_data::<Arc<ConfigModel>>(core_stages::CONFIG_KEY)
            .cloned();

        match outcome {
            Ok(_) => {
                self.assembly_report = context
                    .get_data::<AssemblyReport>(core_stages::ASSEMBLY_REPORT_KEY)
                    .cloned();
                self.session_manager = context
                    .get_data::<Arc<dyn SessionManager>>(core_stages::SESSION_MANAGER_KEY)
                    .cloned();
                self.variables = Some(Arc::new(context.into_variables()));
                self.state = AppState::Running;
                log::info!("Application started at {}", self.app_context.application_root());
                Ok(())
            }
            Err(e) => {
                let stage_id = failing_stage(&e);
                log::error!(
                    "Startup aborted at {}: {}",
                    stage_id.as_deref().unwrap_or("<pipeline>"),
                    e
                );
                self.state = AppState::Aborted {
                    stage_id: stage_id.clone(),
                };
                Err(Error::KernelLifecycleError {
                    phase: KernelLifecyclePhase::Initialize,
                    message: match &stage_id {
                        Some(id) => format!("Startup phase {} failed", id),
                        None => "Startup pipeline failed".to_string(),
                    },
                    stage_id,
                    source: Some(Box::new(e)),
                })
            }
        }
    }

    /// Describe what `init` would do, without constructing anything.
    ///
    /// The manifest is read and parsed so the descriptions can name the
    /// configured types; a manifest that cannot be loaded is an error.
    pub async fn plan(&self) -> Result<Vec<(String, StageResult)>> {
        self.ensure_core_stages().await?;

        let mut context = self.seed_context(StageContext::new_dry_run());
        let config = core_stages::load_manifest(
            &self.settings,
            self.app_context.as_ref(),
            self.parser().as_ref(),
        )?;
        context.set_data(core_stages::CONFIG_KEY, Arc::new(config));

        StagePipeline::from_definition(&STARTUP_PIPELINE)
            .execute(&mut context, &self.stage_registry)
            .await
    }

    /// Stop the started services in reverse registration order.
    pub async fn shutdown(&mut self) -> Result<()> {
        if self.state != AppState::Running {
            return Err(Error::KernelLifecycleError {
                phase: KernelLifecyclePhase::Shutdown,
                stage_id: None,
                message: format!("Server cannot shut down while {}", self.state),
                source: None,
            });
        }

        log::info!("Shutting down services...");
        let result = self.service_manager.stop_services().await;
        self.state = AppState::Stopped;
        result.map_err(|e| Error::KernelLifecycleError {
            phase: KernelLifecyclePhase::Shutdown,
            stage_id: None,
            message: "Services failed to stop".to_string(),
            source: Some(Box::new(Error::from(e))),
        })?;
        log::info!("Shutdown complete.");
        Ok(())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == AppState::Running
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn app_context(&self) -> &Arc<dyn AppContext> {
        &self.app_context
    }

    pub fn factory(&self) -> &Arc<ComponentFactory> {
        &self.factory
    }

    /// The parsed manifest, once the config-load phase has run.
    pub fn config(&self) -> Option<&Arc<ConfigModel>> {
        self.config.as_ref()
    }

    /// The variables published by the last phase; `None` until `init` succeeds.
    pub fn variables(&self) -> Option<&Arc<VariableRegistry>> {
        self.variables.as_ref()
    }

    pub fn assembly_report(&self) -> Option<&AssemblyReport> {
        self.assembly_report.as_ref()
    }

    pub fn binding_components(&self) -> &Arc<BindingComponentRegistry> {
        &self.binding_components
    }

    pub fn service_manager(&self) -> &Arc<dyn ServiceManager> {
        &self.service_manager
    }

    pub fn transaction_manager(&self) -> &Arc<TransactionManager> {
        &self.transaction_manager
    }

    pub fn session_manager(&self) -> Option<&Arc<dyn SessionManager>> {
        self.session_manager.as_ref()
    }

    fn parser(&self) -> Arc<dyn ManifestParser> {
        match &self.manifest_parser {
            Some(parser) => Arc::clone(parser),
            None => Arc::new(SerdeManifestParser::new(self.settings.manifest_format)),
        }
    }

    async fn ensure_core_stages(&self) -> Result<()> {
        let first = STARTUP_PIPELINE.stages.first().copied().unwrap_or_default();
        if !self.stage_registry.has_stage(first).await {
            core_stages::register_core_stages(&self.stage_registry).await?;
        }
        Ok(())
    }

    fn seed_context(&self, mut context: StageContext) -> StageContext {
        context.set_data(core_stages::SETTINGS_KEY, self.settings.clone());
        context.set_data(core_stages::APP_CONTEXT_KEY, Arc::clone(&self.app_context));
        context.set_data(core_stages::FACTORY_KEY, Arc::clone(&self.factory));
        context.set_data(core_stages::SERVICE_MANAGER_KEY, Arc::clone(&self.service_manager));
        context.set_data(
            core_stages::TRANSACTION_MANAGER_KEY,
            Arc::clone(&self.transaction_manager),
        );
        context.set_data(core_stages::MANIFEST_PARSER_KEY, self.parser());
        context.set_data(
            core_stages::BINDING_REGISTRY_KEY,
            Arc::clone(&self.binding_components),
        );
        if let Some(sessions) = &self.session_manager {
            context.set_data(core_stages::SESSION_MANAGER_KEY, Arc::clone(sessions));
        }
        context
    }
}

impl fmt::Debug for AppServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppServer")
            .field("application_root", &self.app_context.application_root())
            .field("state", &self.state)
            .field("settings", &self.settings)
            .finish()
    }
}

fn failing_stage(error: &Error) -> Option<String> {
    match error {
        Error::StageSystem(StageSystemError::StageExecutionFailed { stage_id, .. })
        | Error::StageSystem(StageSystemError::StageNotFoundInPipelineValidation {
            stage_id, ..
        }) => Some(stage_id.clone()),
        _ => None,
    }
}
