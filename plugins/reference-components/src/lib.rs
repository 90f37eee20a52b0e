//! Reference component types for wright.
//!
//! [`ReferenceComponentsPlugin`] registers a small, self-contained type
//! universe under the `reference::` prefix, enough to assemble and start an
//! application without any other plugin:
//!
//! | type identifier               | role                    | constructors                                   |
//! |-------------------------------|-------------------------|------------------------------------------------|
//! | `reference::MemoryStore`      | persistent store        | `(wright::AppConfig, String)`, `()`            |
//! | `reference::EntityCatalog`    | entity class registry   | `()`                                           |
//! | `reference::Engine`           | application engine      | `(AppConfig, AppContext, PersistentStore, ServiceManager)` |
//! | `reference::EnvProperties`    | property manager        | `()`                                           |
//! | `reference::LoggingBinding`   | binding component       | `()`                                           |
//! | `reference::RoleGuards`       | security guard chain    | `(wright::AppEngine)`                          |
//! | `reference::StatusService`    | service                 | `(wright::PersistentStore)`                    |
//! | `reference::Heartbeat`        | service (never built)   | `()`                                           |
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use parking_lot::RwLock;

use wright_core::app::{
    AppContext, AppEngine, BindingComponent, BindingContext, EntityClassRegistry,
    EntityLifeCycle, PersistentStore, PropertyManager, SecurityGuardChain, SessionListener,
};
use wright_core::factory::{AssemblyError, BoxError, TypeDefinition, TypeRegistry};
use wright_core::kernel::constants::{
    APP_CONFIG_TYPE, APP_CONTEXT_TYPE, APP_ENGINE_TYPE, PERSISTENT_STORE_TYPE,
    SERVICE_MANAGER_TYPE,
};
use wright_core::kernel::Instance;
use wright_core::manifest::ConfigModel;
use wright_core::plugin_system::{Plugin, VersionRange};
use wright_core::service::{AppService, ServiceManager};

/// Prefix of the environment variables [`EnvPropertyManager`] reads.
pub const ENV_PROPERTY_PREFIX: &str = "WRIGHT_PROP_";

// --- Persistent store ---

/// Key/value store kept in memory.
#[derive(Debug)]
pub struct MemoryStore {
    name: String,
    records: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: RwLock::new(HashMap::new()),
        }
    }

    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) {
        self.records.write().insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.records.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl PersistentStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }
}

// --- Entities ---

#[derive(Debug, Default)]
pub struct EntityCatalog;

impl EntityClassRegistry for EntityCatalog {
    fn entity_types(&self) -> Vec<String> {
        vec!["Customer".to_string(), "Order".to_string(), "Product".to_string()]
    }
}

/// Counts open sessions.
#[derive(Debug, Default)]
pub struct SessionTracker {
    open: AtomicUsize,
}

impl SessionTracker {
    pub fn open_sessions(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }
}

impl EntityLifeCycle for SessionTracker {
    fn name(&self) -> &str {
        "session-tracker"
    }

    fn as_session_listener(self: Arc<Self>) -> Option<Arc<dyn SessionListener>> {
        Some(self)
    }
}

impl SessionListener for SessionTracker {
    fn session_created(&self, session_id: &str) {
        self.open.fetch_add(1, Ordering::SeqCst);
        debug!("Session {} opened", session_id);
    }

    fn session_destroyed(&self, session_id: &str) {
        self.open.fetch_sub(1, Ordering::SeqCst);
        debug!("Session {} closed", session_id);
    }
}

/// Logs entity changes.
#[derive(Debug, Default)]
pub struct AuditTrail;

impl EntityLifeCycle for AuditTrail {
    fn name(&self) -> &str {
        "audit-trail"
    }
}

// --- Engine ---

#[derive(Debug)]
pub struct ReferenceEngine {
    config: Arc<ConfigModel>,
    store: Arc<dyn PersistentStore>,
    application_root: String,
}

impl ReferenceEngine {
    pub fn new(
        config: Arc<ConfigModel>,
        context: &dyn AppContext,
        store: Arc<dyn PersistentStore>,
    ) -> Self {
        Self {
            config,
            store,
            application_root: context.application_root().to_string(),
        }
    }

    pub fn config(&self) -> &Arc<ConfigModel> {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn PersistentStore> {
        &self.store
    }
}

impl AppEngine for ReferenceEngine {
    fn name(&self) -> &str {
        &self.application_root
    }

    fn initialize_lifecycle_listeners(&self) -> Result<Vec<Arc<dyn EntityLifeCycle>>, BoxError> {
        Ok(vec![Arc::new(SessionTracker::default()), Arc::new(AuditTrail)])
    }
}

// --- Properties ---

/// Property manager reading `WRIGHT_PROP_*` variables.
///
/// `WRIGHT_PROP_APP_HTTP_DOMAIN=example.org` becomes
/// `app.http.domain = example.org`.
#[derive(Debug)]
pub struct EnvPropertyManager {
    vars: BTreeMap<String, String>,
    engine: RwLock<Option<Arc<dyn AppEngine>>>,
}

impl EnvPropertyManager {
    /// Snapshot the process environment.
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I: IntoIterator<Item = (String, String)>>(vars: I) -> Self {
        let vars = vars
            .into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(ENV_PROPERTY_PREFIX)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_lowercase().replace('_', "."), value))
            })
            .collect();
        Self {
            vars,
            engine: RwLock::new(None),
        }
    }
}

impl PropertyManager for EnvPropertyManager {
    fn set_app_engine(&self, engine: Arc<dyn AppEngine>) {
        *self.engine.write() = Some(engine);
    }

    fn properties(&self) -> Result<BTreeMap<String, String>, BoxError> {
        Ok(self.vars.clone())
    }
}

// --- Binding ---

/// Binding component that only reports what it was wired to.
#[derive(Debug, Default)]
pub struct LoggingBinding {
    context: RwLock<Option<BindingContext>>,
}

impl LoggingBinding {
    pub fn is_wired(&self) -> bool {
        self.context.read().is_some()
    }
}

impl BindingComponent for LoggingBinding {
    fn name(&self) -> &str {
        "logging-binding"
    }

    fn set_context(&self, context: BindingContext) -> Result<(), BoxError> {
        info!(
            "Binding {} to engine {} ({} entity types, guards: {})",
            self.name(),
            context.engine.name(),
            context.entity_class_registry.entity_types().len(),
            context
                .security_guard_chain
                .as_ref()
                .map(|chain| chain.guards().join(","))
                .unwrap_or_else(|| "none".to_string())
        );
        *self.context.write() = Some(context);
        Ok(())
    }
}

#[derive(Debug)]
pub struct RoleGuards {
    engine: String,
}

impl SecurityGuardChain for RoleGuards {
    fn guards(&self) -> Vec<String> {
        vec![
            format!("{}:authenticated", self.engine),
            format!("{}:role-check", self.engine),
        ]
    }
}

// --- Services ---

/// Reports the store it runs against when started and stopped.
#[derive(Debug)]
pub struct StatusService {
    store: Arc<dyn PersistentStore>,
}

#[async_trait]
impl AppService for StatusService {
    async fn start(&self) -> Result<(), BoxError> {
        info!("Status service up (store: {})", self.store.name());
        Ok(())
    }

    async fn stop(&self) -> Result<(), BoxError> {
        info!("Status service down (store: {})", self.store.name());
        Ok(())
    }
}

/// Zero-argument service; assembly skips it.
#[derive(Debug, Default)]
pub struct Heartbeat;

// --- Plugin ---

#[derive(Debug, Default)]
pub struct ReferenceComponentsPlugin;

impl ReferenceComponentsPlugin {
    fn definitions() -> Vec<TypeDefinition> {
        vec![
            TypeDefinition::new("reference::MemoryStore")
                .constructor(&[APP_CONFIG_TYPE, "String"], |args| {
                    let config = args.get::<Arc<ConfigModel>>(0)?;
                    let store = MemoryStore::new(args.get::<String>(1)?);
                    // Seed the store with the manifest's properties.
                    for (key, value) in config.properties().snapshot() {
                        store.put(key, value);
                    }
                    let store: Arc<dyn PersistentStore> = Arc::new(store);
                    Ok(Instance::new(store))
                })
                .constructor(&[], |_| {
                    let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore::new("memory"));
                    Ok(Instance::new(store))
                }),
            TypeDefinition::new("reference::EntityCatalog").constructor(&[], |_| {
                let registry: Arc<dyn EntityClassRegistry> = Arc::new(EntityCatalog);
                Ok(Instance::new(registry))
            }),
            TypeDefinition::new("reference::Engine").constructor(
                &[
                    APP_CONFIG_TYPE,
                    APP_CONTEXT_TYPE,
                    PERSISTENT_STORE_TYPE,
                    SERVICE_MANAGER_TYPE,
                ],
                |args| {
                    let context = args.get::<Arc<dyn AppContext>>(1)?;
                    let services = args.get::<Arc<dyn ServiceManager>>(3)?;
                    debug!("Engine sees {} registered service(s)", services.service_names().len());
                    let engine: Arc<dyn AppEngine> = Arc::new(ReferenceEngine::new(
                        args.get::<Arc<ConfigModel>>(0)?,
                        context.as_ref(),
                        args.get::<Arc<dyn PersistentStore>>(2)?,
                    ));
                    Ok(Instance::new(engine))
                },
            ),
            TypeDefinition::new("reference::EnvProperties").constructor(&[], |_| {
                let manager: Arc<dyn PropertyManager> = Arc::new(EnvPropertyManager::from_env());
                Ok(Instance::new(manager))
            }),
            TypeDefinition::new("reference::LoggingBinding").constructor(&[], |_| {
                let component: Arc<dyn BindingComponent> = Arc::new(LoggingBinding::default());
                Ok(Instance::new(component))
            }),
            TypeDefinition::new("reference::RoleGuards").constructor(&[APP_ENGINE_TYPE], |args| {
                let engine = args.get::<Arc<dyn AppEngine>>(0)?;
                let chain: Arc<dyn SecurityGuardChain> = Arc::new(RoleGuards {
                    engine: engine.name().to_string(),
                });
                Ok(Instance::new(chain))
            }),
            TypeDefinition::new("reference::StatusService").constructor(
                &[PERSISTENT_STORE_TYPE],
                |args| {
                    let service = Arc::new(StatusService {
                        store: args.get::<Arc<dyn PersistentStore>>(0)?,
                    });
                    Ok(Instance::new(Arc::clone(&service)).with_service_hook(service))
                },
            ),
            TypeDefinition::new("reference::Heartbeat")
                .constructor(&[], |_| Ok(Instance::new(Arc::new(Heartbeat)))),
        ]
    }
}

impl Plugin for ReferenceComponentsPlugin {
    fn name(&self) -> &'static str {
        "reference-components"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn compatible_api_versions(&self) -> Vec<VersionRange> {
        const COMPATIBLE_API_REQ: &str = "^0.1";
        match VersionRange::from_constraint(COMPATIBLE_API_REQ) {
            Ok(range) => vec![range],
            Err(e) => {
                log::error!(
                    "Failed to parse API version requirement ('{}') for {}: {}",
                    COMPATIBLE_API_REQ,
                    self.name(),
                    e
                );
                vec![]
            }
        }
    }

    fn register_types(&self, types: &mut TypeRegistry) -> Result<(), AssemblyError> {
        for definition in Self::definitions() {
            types.register(definition)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use wright_core::app::LocalAppContext;
    use wright_core::manifest::ManifestFormat;
    use wright_core::{AppServer, AppState, PluginRegistry, ServerSettings};

    const MANIFEST: &str = r#"
        entity_class_registry = "reference::EntityCatalog"
        engine = "reference::Engine"
        security_guard_chain = "reference::RoleGuards"

        [persistent_store]
        type = "reference::MemoryStore"
        constructor_args = [
            { type = "wright::AppConfig" },
            { type = "String", value = "orders" },
        ]

        [properties]
        "app.http.port" = 8080

        [[binding_components]]
        type = "reference::LoggingBinding"

        [[services]]
        name = "status"
        type = "reference::StatusService"

        [[services]]
        name = "heartbeat"
        type = "reference::Heartbeat"
    "#;

    fn types() -> TypeRegistry {
        let mut registry = PluginRegistry::for_current_api().unwrap();
        registry.register_plugin(Box::new(ReferenceComponentsPlugin)).unwrap();
        registry.build_type_registry().unwrap()
    }

    #[test]
    fn test_registers_reference_types() {
        let types = types();
        assert_eq!(types.count(), 8);
        assert!(types.has_type("reference::Engine"));
        let store = types.resolve("reference::MemoryStore").unwrap();
        assert_eq!(store.constructors().len(), 2);
    }

    #[test]
    fn test_env_properties_mapping() {
        let manager = EnvPropertyManager::from_vars(vec![
            ("WRIGHT_PROP_APP_HTTP_DOMAIN".to_string(), "example.org".to_string()),
            ("WRIGHT_PROP_".to_string(), "ignored".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ]);
        let properties = manager.properties().unwrap();
        assert_eq!(properties.len(), 1);
        assert_eq!(properties.get("app.http.domain").map(String::as_str), Some("example.org"));
    }

    #[test]
    fn test_session_tracker_counts() {
        let tracker = Arc::new(SessionTracker::default());
        let listener = Arc::clone(&tracker).as_session_listener().unwrap();
        listener.session_created("a");
        listener.session_created("b");
        listener.session_destroyed("a");
        assert_eq!(tracker.open_sessions(), 1);
    }

    #[tokio::test]
    async fn test_reference_application_starts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("WEB-INF")).unwrap();
        fs::write(dir.path().join("WEB-INF/application.toml"), MANIFEST).unwrap();

        let context: Arc<dyn AppContext> = Arc::new(LocalAppContext::new(dir.path(), "/orders"));
        let mut server = AppServer::new(context, types()).with_settings(ServerSettings {
            manifest_format: ManifestFormat::Toml,
            ..ServerSettings::default()
        });
        server.init().await.unwrap();

        assert_eq!(server.state(), &AppState::Running);
        assert_eq!(
            server.assembly_report().unwrap().skipped,
            vec!["heartbeat".to_string()]
        );
        assert!(server.service_manager().service("status").is_some());
        assert_eq!(server.binding_components().len(), 1);

        server.shutdown().await.unwrap();
        assert_eq!(server.state(), &AppState::Stopped);
    }
}
