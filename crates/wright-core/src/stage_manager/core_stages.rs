//! The startup stages of an [`AppServer`](crate::kernel::bootstrap::AppServer).
//!
//! Each stage reads what earlier stages (or the server) put into the
//! [`StageContext`] under the `*_KEY` constants below, and adds its own
//! results. Stages run strictly in [`STARTUP_PIPELINE`] order.
use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::app::{
    AppContext, AppEngine, BindingComponent, BindingComponentRegistry, BindingContext,
    EntityClassRegistry, EntityLifeCycle, HttpMessageSender, HttpSmsSender,
    InMemorySessionManager, MessageSender, PersistentStore, PropertyManager,
    SecurityGuardChain, SessionManager, SmsSender, TransactionManager,
};
use crate::factory::error::AssemblyError;
use crate::factory::ComponentFactory;
use crate::kernel::component::Instance;
use crate::kernel::constants::*;
use crate::kernel::error::Result;
use crate::kernel::settings::ServerSettings;
use crate::manifest::error::ManifestError;
use crate::manifest::{ConfigModel, ManifestParser};
use crate::port::{PortResolver, HTTP_PROTOCOL};
use crate::service::{AssemblyReport, ServiceAssembler, ServiceManager};
use crate::stage_manager::pipeline::PipelineDefinition;
use crate::stage_manager::registry::SharedStageRegistry;
use crate::stage_manager::{Stage, StageContext};

// Constants for context keys: seeded by the server
pub const SETTINGS_KEY: &str = "settings";
pub const APP_CONTEXT_KEY: &str = "app_context";
pub const FACTORY_KEY: &str = "component_factory";
pub const SERVICE_MANAGER_KEY: &str = "service_manager";
pub const TRANSACTION_MANAGER_KEY: &str = "transaction_manager";
pub const MANIFEST_PARSER_KEY: &str = "manifest_parser";
pub const BINDING_REGISTRY_KEY: &str = "binding_component_registry";
/// Optional; pre-init creates an in-memory session manager when absent
pub const SESSION_MANAGER_KEY: &str = "session_manager";

// Constants for context keys: produced by stages
pub const CONFIG_KEY: &str = "config";
pub const ENTITY_REGISTRY_KEY: &str = "entity_class_registry";
pub const PERSISTENT_STORE_KEY: &str = "persistent_store";
pub const ENGINE_KEY: &str = "engine";
pub const MANAGER_PROPERTIES_KEY: &str = "manager_properties";
pub const LIFECYCLE_LISTENERS_KEY: &str = "lifecycle_listeners";
pub const ASSEMBLY_REPORT_KEY: &str = "assembly_report";

/// Ordered startup phases.
pub const STARTUP_PIPELINE: PipelineDefinition = PipelineDefinition {
    name: "startup",
    stages: &[
        "core::pre_init",
        "core::config_load",
        "core::port_binding",
        "core::entity_registry_init",
        "core::persistent_store_init",
        "core::engine_init",
        "core::property_manager_init",
        "core::property_merge",
        "core::lifecycle_listener_init",
        "core::property_republish",
        "core::binding_component_install",
        "core::post_init_rebind",
        "core::service_assembly",
        "core::service_start",
    ],
    description: Some("Assembles the application object graph from its manifest"),
};

/// Register every startup stage.
pub async fn register_core_stages(registry: &SharedStageRegistry) -> Result<()> {
    registry.register_stage(Box::new(PreInitStage)).await?;
    registry.register_stage(Box::new(ConfigLoadStage)).await?;
    registry.register_stage(Box::new(PortBindingStage)).await?;
    registry.register_stage(Box::new(EntityRegistryInitStage)).await?;
    registry.register_stage(Box::new(PersistentStoreInitStage)).await?;
    registry.register_stage(Box::new(EngineInitStage)).await?;
    registry.register_stage(Box::new(PropertyManagerInitStage)).await?;
    registry.register_stage(Box::new(PropertyMergeStage)).await?;
    registry.register_stage(Box::new(LifecycleListenerInitStage)).await?;
    registry.register_stage(Box::new(PropertyRepublishStage)).await?;
    registry.register_stage(Box::new(BindingComponentInstallStage)).await?;
    registry.register_stage(Box::new(PostInitRebindStage)).await?;
    registry.register_stage(Box::new(ServiceAssemblyStage)).await?;
    registry.register_stage(Box::new(ServiceStartStage)).await?;
    Ok(())
}

/// Read and parse the manifest through the context collaborator.
pub fn load_manifest(
    settings: &ServerSettings,
    app_context: &dyn AppContext,
    parser: &dyn ManifestParser,
) -> std::result::Result<ConfigModel, ManifestError> {
    let path = settings.manifest_path();
    let mut input = app_context
        .input_stream(&path)
        .map_err(|source| ManifestError::ManifestUnreadable {
            path: path.clone(),
            source,
        })?;
    log::debug!("Parsing manifest {} with the {} parser", path, parser.name());
    parser.parse(&mut input)
}

/// Take the `Arc<dyn Trait>` a constructor of `type_id` produced.
fn typed<T: Clone + Send + Sync + 'static>(
    instance: &Instance,
    type_id: &str,
) -> std::result::Result<T, AssemblyError> {
    instance
        .downcast::<T>()
        .ok_or_else(|| AssemblyError::TypeMismatch {
            type_id: type_id.to_string(),
            expected: std::any::type_name::<T>(),
        })
}

fn configured(context: &StageContext, what: &str) -> String {
    match context.get_data::<Arc<ConfigModel>>(CONFIG_KEY) {
        Some(_) => what.to_string(),
        None => format!("{} (manifest not loaded)", what),
    }
}

// --- Core Stage Definitions ---

/// Registers the kernel-owned services and creates the session manager.
#[derive(Debug)]
pub struct PreInitStage;

#[async_trait]
impl Stage for PreInitStage {
    fn id(&self) -> &str { "core::pre_init" }
    fn name(&self) -> &str { "Pre-Initialization" }
    fn description(&self) -> &str { "Registers the transaction manager and senders and creates the session manager." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let settings = context.require::<ServerSettings>(SETTINGS_KEY)?;
        let services = context.require::<Arc<dyn ServiceManager>>(SERVICE_MANAGER_KEY)?;
        let transactions = context.require::<Arc<TransactionManager>>(TRANSACTION_MANAGER_KEY)?;

        services.add_service(
            SERVICE_TRANSACTION_MANAGER,
            Instance::new(Arc::clone(&transactions)).with_service_hook(transactions.clone()),
        );
        let message_sender: Arc<dyn MessageSender> = Arc::new(HttpMessageSender::new());
        services.add_service(SERVICE_MESSAGE_SENDER, Instance::new(message_sender));
        let sms_sender: Arc<dyn SmsSender> =
            Arc::new(HttpSmsSender::new(settings.sms_endpoint_template.clone()));
        services.add_service(SERVICE_SMS_SENDER, Instance::new(sms_sender));

        let variables = context.variables_mut();
        variables.put(SERVICE_TRANSACTION_MANAGER, Instance::new(Arc::clone(&transactions)));
        variables.put(TRANSACTION_MANAGER_TYPE, Instance::new(transactions));

        if !context.has_data(SESSION_MANAGER_KEY) {
            let sessions: Arc<dyn SessionManager> = Arc::new(InMemorySessionManager::new());
            context.set_data(SESSION_MANAGER_KEY, sessions);
        }
        Ok(())
    }

    fn dry_run_description(&self, _context: &StageContext) -> String {
        format!(
            "Would register services {}, {} and {} and create the session manager",
            SERVICE_TRANSACTION_MANAGER, SERVICE_MESSAGE_SENDER, SERVICE_SMS_SENDER
        )
    }
}

/// Reads the manifest.
#[derive(Debug)]
pub struct ConfigLoadStage;

#[async_trait]
impl Stage for ConfigLoadStage {
    fn id(&self) -> &str { "core::config_load" }
    fn name(&self) -> &str { "Configuration Load" }
    fn description(&self) -> &str { "Reads and parses the application manifest." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let settings = context.require::<ServerSettings>(SETTINGS_KEY)?;
        let app_context = context.require::<Arc<dyn AppContext>>(APP_CONTEXT_KEY)?;
        let parser = context.require::<Arc<dyn ManifestParser>>(MANIFEST_PARSER_KEY)?;

        let config = load_manifest(&settings, app_context.as_ref(), parser.as_ref())?;
        log::info!(
            "Loaded manifest {}: {} service(s), {} binding component(s)",
            settings.manifest_path(),
            config.services().len(),
            config.binding_components().len()
        );
        context.set_data(CONFIG_KEY, Arc::new(config));
        Ok(())
    }

    fn dry_run_description(&self, context: &StageContext) -> String {
        let path = context
            .get_data::<ServerSettings>(SETTINGS_KEY)
            .map(|s| s.manifest_path())
            .unwrap_or_default();
        format!("Would read the manifest at {}", path)
    }
}

/// Resolves the http and https endpoints.
#[derive(Debug)]
pub struct PortBindingStage;

#[async_trait]
impl Stage for PortBindingStage {
    fn id(&self) -> &str { "core::port_binding" }
    fn name(&self) -> &str { "Port Binding" }
    fn description(&self) -> &str { "Resolves the application's endpoints and publishes them to the context." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let config = context.require::<Arc<ConfigModel>>(CONFIG_KEY)?;
        let app_context = context.require::<Arc<dyn AppContext>>(APP_CONTEXT_KEY)?;

        let resolver = PortResolver::new(&config, app_context.application_root());
        let http = resolver.resolve(Some(HTTP_PROTOCOL))?;
        let https = resolver.resolve(Some("https"))?;
        log::info!("Application endpoint: {}", http);
        app_context.set_app_ports(http, https, config.property(APP_BASE_URL_KEY));
        Ok(())
    }

    fn dry_run_description(&self, context: &StageContext) -> String {
        let port = context
            .get_data::<Arc<ConfigModel>>(CONFIG_KEY)
            .and_then(|c| c.property(APP_HTTP_PORT_KEY))
            .unwrap_or_else(|| "<unset>".to_string());
        format!("Would resolve endpoints ({} = {})", APP_HTTP_PORT_KEY, port)
    }
}

/// Builds the entity class registry.
#[derive(Debug)]
pub struct EntityRegistryInitStage;

#[async_trait]
impl Stage for EntityRegistryInitStage {
    fn id(&self) -> &str { "core::entity_registry_init" }
    fn name(&self) -> &str { "Entity Registry Initialization" }
    fn description(&self) -> &str { "Constructs the entity class registry." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let config = context.require::<Arc<ConfigModel>>(CONFIG_KEY)?;
        let factory = context.require::<Arc<ComponentFactory>>(FACTORY_KEY)?;

        let type_id = config.entity_class_registry();
        let instance = factory.construct_default(type_id)?;
        let registry = typed::<Arc<dyn EntityClassRegistry>>(&instance, type_id)?;
        log::info!("Entity class registry {} knows {} type(s)", type_id, registry.entity_types().len());
        context.set_data(ENTITY_REGISTRY_KEY, registry);
        Ok(())
    }

    fn dry_run_description(&self, context: &StageContext) -> String {
        let type_id = context
            .get_data::<Arc<ConfigModel>>(CONFIG_KEY)
            .map(|c| c.entity_class_registry().to_string());
        match type_id {
            Some(type_id) => format!("Would construct entity class registry {}", type_id),
            None => configured(context, "Would construct the entity class registry"),
        }
    }
}

/// Builds the persistent store from its declared arguments.
#[derive(Debug)]
pub struct PersistentStoreInitStage;

#[async_trait]
impl Stage for PersistentStoreInitStage {
    fn id(&self) -> &str { "core::persistent_store_init" }
    fn name(&self) -> &str { "Persistent Store Initialization" }
    fn description(&self) -> &str { "Constructs the persistent store with its declared constructor arguments." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let config = context.require::<Arc<ConfigModel>>(CONFIG_KEY)?;
        let factory = context.require::<Arc<ComponentFactory>>(FACTORY_KEY)?;

        let descriptor = config.persistent_store();
        let instance = if descriptor.constructor_args.is_empty() {
            factory.construct_default(&descriptor.type_id)?
        } else {
            factory.construct_explicit(&descriptor.type_id, &descriptor.constructor_args, &config)?
        };
        let store = typed::<Arc<dyn PersistentStore>>(&instance, &descriptor.type_id)?;
        log::info!("Persistent store {} ready", store.name());
        context.set_data(PERSISTENT_STORE_KEY, store);
        Ok(())
    }

    fn dry_run_description(&self, context: &StageContext) -> String {
        match context.get_data::<Arc<ConfigModel>>(CONFIG_KEY) {
            Some(config) => {
                let descriptor = config.persistent_store();
                let args: Vec<&str> = descriptor.constructor_args.iter().map(|a| a.type_id()).collect();
                format!("Would construct persistent store {}({})", descriptor.type_id, args.join(", "))
            }
            None => configured(context, "Would construct the persistent store"),
        }
    }
}

/// Builds the application engine and binds the service registry to it.
#[derive(Debug)]
pub struct EngineInitStage;

#[async_trait]
impl Stage for EngineInitStage {
    fn id(&self) -> &str { "core::engine_init" }
    fn name(&self) -> &str { "Engine Initialization" }
    fn description(&self) -> &str { "Constructs the application engine and binds the service registry to it." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let config = context.require::<Arc<ConfigModel>>(CONFIG_KEY)?;
        let factory = context.require::<Arc<ComponentFactory>>(FACTORY_KEY)?;
        let app_context = context.require::<Arc<dyn AppContext>>(APP_CONTEXT_KEY)?;
        let store = context.require::<Arc<dyn PersistentStore>>(PERSISTENT_STORE_KEY)?;
        let services = context.require::<Arc<dyn ServiceManager>>(SERVICE_MANAGER_KEY)?;

        let type_id = config.engine();
        let instance = factory.construct_exact(
            type_id,
            vec![
                (APP_CONFIG_TYPE, Instance::new(Arc::clone(&config))),
                (APP_CONTEXT_TYPE, Instance::new(Arc::clone(&app_context))),
                (PERSISTENT_STORE_TYPE, Instance::new(store)),
                (SERVICE_MANAGER_TYPE, Instance::new(Arc::clone(&services))),
            ],
        )?;
        let engine = typed::<Arc<dyn AppEngine>>(&instance, type_id)?;

        services.set_context(app_context.application_root(), Arc::clone(&engine));
        log::info!("Engine {} bound to {}", engine.name(), app_context.application_root());
        context.set_data(ENGINE_KEY, engine);
        Ok(())
    }

    fn dry_run_description(&self, context: &StageContext) -> String {
        match context.get_data::<Arc<ConfigModel>>(CONFIG_KEY) {
            Some(config) => format!(
                "Would construct engine {}({}, {}, {}, {})",
                config.engine(),
                APP_CONFIG_TYPE,
                APP_CONTEXT_TYPE,
                PERSISTENT_STORE_TYPE,
                SERVICE_MANAGER_TYPE
            ),
            None => configured(context, "Would construct the engine"),
        }
    }
}

/// Builds the optional property manager and pulls its properties.
#[derive(Debug)]
pub struct PropertyManagerInitStage;

#[async_trait]
impl Stage for PropertyManagerInitStage {
    fn id(&self) -> &str { "core::property_manager_init" }
    fn name(&self) -> &str { "Property Manager Initialization" }
    fn description(&self) -> &str { "Constructs the property manager, if configured, and reads its properties." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let config = context.require::<Arc<ConfigModel>>(CONFIG_KEY)?;

        let properties = match config.property_manager() {
            Some(type_id) => {
                let factory = context.require::<Arc<ComponentFactory>>(FACTORY_KEY)?;
                let engine = context.require::<Arc<dyn AppEngine>>(ENGINE_KEY)?;

                let instance = factory.construct_default(type_id)?;
                let manager = typed::<Arc<dyn PropertyManager>>(&instance, type_id)?;
                manager.set_app_engine(engine);
                let properties = manager.properties().map_err(|source| {
                    AssemblyError::ComponentSetupFailure {
                        type_id: type_id.to_string(),
                        source,
                    }
                })?;
                log::info!("Property manager {} supplied {} properties", type_id, properties.len());
                properties
            }
            None => {
                log::debug!("No property manager configured");
                BTreeMap::new()
            }
        };
        context.set_data(MANAGER_PROPERTIES_KEY, properties);
        Ok(())
    }

    fn dry_run_description(&self, context: &StageContext) -> String {
        match context
            .get_data::<Arc<ConfigModel>>(CONFIG_KEY)
            .and_then(|c| c.property_manager().map(str::to_string))
        {
            Some(type_id) => format!("Would construct property manager {}", type_id),
            None => "Would skip the property manager (none configured)".to_string(),
        }
    }
}

/// Overrides manifest properties with the property manager's.
#[derive(Debug)]
pub struct PropertyMergeStage;

#[async_trait]
impl Stage for PropertyMergeStage {
    fn id(&self) -> &str { "core::property_merge" }
    fn name(&self) -> &str { "Property Merge" }
    fn description(&self) -> &str { "Merges property-manager values over the manifest properties." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let config = context.require::<Arc<ConfigModel>>(CONFIG_KEY)?;
        let services = context.require::<Arc<dyn ServiceManager>>(SERVICE_MANAGER_KEY)?;
        let properties = context.require::<BTreeMap<String, String>>(MANAGER_PROPERTIES_KEY)?;

        for (key, value) in &properties {
            if let Some(previous) = config.properties().insert(key.as_str(), value.as_str()) {
                log::debug!("Property {} overridden ({} -> {})", key, previous, value);
            }
            services.add_app_property(key, value);
        }
        Ok(())
    }
}

/// Hooks the engine's lifecycle listeners into the session manager.
#[derive(Debug)]
pub struct LifecycleListenerInitStage;

#[async_trait]
impl Stage for LifecycleListenerInitStage {
    fn id(&self) -> &str { "core::lifecycle_listener_init" }
    fn name(&self) -> &str { "Lifecycle Listener Initialization" }
    fn description(&self) -> &str { "Registers session-capable lifecycle listeners with the session manager." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let engine = context.require::<Arc<dyn AppEngine>>(ENGINE_KEY)?;
        let sessions = context.require::<Arc<dyn SessionManager>>(SESSION_MANAGER_KEY)?;

        let listeners = engine
            .initialize_lifecycle_listeners()
            .map_err(|source| AssemblyError::LifecycleListenerInitFailure { source })?;
        for listener in &listeners {
            if let Some(session_listener) = Arc::clone(listener).as_session_listener() {
                log::debug!("Lifecycle listener {} observes sessions", listener.name());
                sessions.add_session_listener(session_listener);
            }
        }
        context.set_data::<Vec<Arc<dyn EntityLifeCycle>>>(LIFECYCLE_LISTENERS_KEY, listeners);
        Ok(())
    }
}

/// Pushes the merged properties to the service registry again.
#[derive(Debug)]
pub struct PropertyRepublishStage;

#[async_trait]
impl Stage for PropertyRepublishStage {
    fn id(&self) -> &str { "core::property_republish" }
    fn name(&self) -> &str { "Property Republish" }
    fn description(&self) -> &str { "Publishes every merged property to the service registry." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let config = context.require::<Arc<ConfigModel>>(CONFIG_KEY)?;
        let services = context.require::<Arc<dyn ServiceManager>>(SERVICE_MANAGER_KEY)?;

        for (key, value) in config.properties().snapshot() {
            services.add_app_property(&key, &value);
        }
        Ok(())
    }
}

/// Constructs and wires the binding components.
#[derive(Debug)]
pub struct BindingComponentInstallStage;

#[async_trait]
impl Stage for BindingComponentInstallStage {
    fn id(&self) -> &str { "core::binding_component_install" }
    fn name(&self) -> &str { "Binding Component Installation" }
    fn description(&self) -> &str { "Constructs, wires and installs the binding components." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let config = context.require::<Arc<ConfigModel>>(CONFIG_KEY)?;
        let factory = context.require::<Arc<ComponentFactory>>(FACTORY_KEY)?;
        let app_context = context.require::<Arc<dyn AppContext>>(APP_CONTEXT_KEY)?;
        let engine = context.require::<Arc<dyn AppEngine>>(ENGINE_KEY)?;
        let sessions = context.require::<Arc<dyn SessionManager>>(SESSION_MANAGER_KEY)?;
        let entities = context.require::<Arc<dyn EntityClassRegistry>>(ENTITY_REGISTRY_KEY)?;
        let installed = context.require::<Arc<BindingComponentRegistry>>(BINDING_REGISTRY_KEY)?;

        let security_guard_chain = match config.security_guard_chain() {
            Some(type_id) => {
                let instance = factory.construct_exact(
                    type_id,
                    vec![(APP_ENGINE_TYPE, Instance::new(Arc::clone(&engine)))],
                )?;
                Some(typed::<Arc<dyn SecurityGuardChain>>(&instance, type_id)?)
            }
            None => None,
        };

        for descriptor in config.binding_components() {
            let type_id = descriptor.type_id.as_str();
            let instance = factory.construct_default(type_id)?;
            let component = typed::<Arc<dyn BindingComponent>>(&instance, type_id)?;
            component
                .set_context(BindingContext {
                    config: Arc::clone(&config),
                    context: Arc::clone(&app_context),
                    engine: Arc::clone(&engine),
                    session_manager: Arc::clone(&sessions),
                    security_guard_chain: security_guard_chain.clone(),
                    entity_class_registry: Arc::clone(&entities),
                })
                .map_err(|source| AssemblyError::ComponentSetupFailure {
                    type_id: type_id.to_string(),
                    source,
                })?;
            sessions.set_uid_generator(app_context.uid_generator());
            installed.add(component);
        }
        Ok(())
    }

    fn dry_run_description(&self, context: &StageContext) -> String {
        match context.get_data::<Arc<ConfigModel>>(CONFIG_KEY) {
            Some(config) => {
                let types: Vec<&str> = config
                    .binding_components()
                    .iter()
                    .map(|d| d.type_id.as_str())
                    .collect();
                format!("Would install binding components [{}]", types.join(", "))
            }
            None => configured(context, "Would install the binding components"),
        }
    }
}

/// Replaces all variables with the post-init set.
#[derive(Debug)]
pub struct PostInitRebindStage;

#[async_trait]
impl Stage for PostInitRebindStage {
    fn id(&self) -> &str { "core::post_init_rebind" }
    fn name(&self) -> &str { "Post-Init Rebind" }
    fn description(&self) -> &str { "Clears the variable registry and publishes config, context, engine and persistent store." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let config = context.require::<Arc<ConfigModel>>(CONFIG_KEY)?;
        let app_context = context.require::<Arc<dyn AppContext>>(APP_CONTEXT_KEY)?;
        let engine = context.require::<Arc<dyn AppEngine>>(ENGINE_KEY)?;
        let store = context.require::<Arc<dyn PersistentStore>>(PERSISTENT_STORE_KEY)?;

        let variables = context.variables_mut();
        variables.clear();
        variables.put(APP_CONFIG_ALIAS, Instance::new(Arc::clone(&config)));
        variables.put(APP_CONFIG_TYPE, Instance::new(config));
        variables.put(APP_CONTEXT_ALIAS, Instance::new(Arc::clone(&app_context)));
        variables.put(APP_CONTEXT_TYPE, Instance::new(app_context));
        variables.put(APP_ENGINE_ALIAS, Instance::new(Arc::clone(&engine)));
        variables.put(APP_ENGINE_TYPE, Instance::new(engine));
        variables.put(PERSISTENT_STORE_ALIAS, Instance::new(Arc::clone(&store)));
        variables.put(PERSISTENT_STORE_TYPE, Instance::new(store));
        log::debug!("Published variables: {:?}", variables.keys());
        Ok(())
    }
}

/// Builds the declared services.
#[derive(Debug)]
pub struct ServiceAssemblyStage;

#[async_trait]
impl Stage for ServiceAssemblyStage {
    fn id(&self) -> &str { "core::service_assembly" }
    fn name(&self) -> &str { "Service Assembly" }
    fn description(&self) -> &str { "Constructs the declared services and registers them." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let config = context.require::<Arc<ConfigModel>>(CONFIG_KEY)?;
        let factory = context.require::<Arc<ComponentFactory>>(FACTORY_KEY)?;
        let services = context.require::<Arc<dyn ServiceManager>>(SERVICE_MANAGER_KEY)?;

        let report = ServiceAssembler::new(&factory).assemble(
            config.services(),
            context.variables(),
            services.as_ref(),
        )?;
        context.set_data::<AssemblyReport>(ASSEMBLY_REPORT_KEY, report);
        Ok(())
    }

    fn dry_run_description(&self, context: &StageContext) -> String {
        match context.get_data::<Arc<ConfigModel>>(CONFIG_KEY) {
            Some(config) => {
                let names: Vec<&str> = config.services().iter().map(|s| s.name.as_str()).collect();
                format!("Would assemble services [{}]", names.join(", "))
            }
            None => configured(context, "Would assemble the declared services"),
        }
    }
}

/// Starts the service registry.
#[derive(Debug)]
pub struct ServiceStartStage;

#[async_trait]
impl Stage for ServiceStartStage {
    fn id(&self) -> &str { "core::service_start" }
    fn name(&self) -> &str { "Service Start" }
    fn description(&self) -> &str { "Starts all registered services." }

    async fn execute(&self, context: &mut StageContext) -> Result<()> {
        let services = context.require::<Arc<dyn ServiceManager>>(SERVICE_MANAGER_KEY)?;
        services.start_services().await?;
        Ok(())
    }
}
