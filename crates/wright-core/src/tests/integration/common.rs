#![cfg(test)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tempfile::TempDir;

use crate::app::{
    AppContext, AppEngine, BindingComponent, BindingContext, EntityClassRegistry,
    EntityLifeCycle, LocalAppContext, PersistentStore, PropertyManager, SecurityGuardChain,
    SessionListener,
};
use crate::factory::{BoxError, TypeDefinition, TypeRegistry};
use crate::kernel::bootstrap::AppServer;
use crate::kernel::component::Instance;
use crate::kernel::settings::ServerSettings;
use crate::manifest::{ConfigModel, ManifestFormat};
use crate::service::{AppService, AppServiceManager, ServiceManager};

pub const ROOT: &str = "/shop";

// ===== PROBE =====

/// Shared record of what the test components observed.
#[derive(Debug, Default)]
pub struct Probe {
    pub store_config: Mutex<Option<Arc<ConfigModel>>>,
    pub store: Mutex<Option<Arc<dyn PersistentStore>>>,
    pub engine_store: Mutex<Option<Arc<dyn PersistentStore>>>,
    pub service_store: Mutex<Option<Arc<dyn PersistentStore>>>,
    pub binding_contexts: Mutex<Vec<BindingContext>>,
    /// Whether the session manager had a uid generator when each binding
    /// component received its context.
    pub generator_at_binding: Mutex<Vec<bool>>,
    pub audit_config: Mutex<Option<Arc<ConfigModel>>>,
    pub events: Mutex<Vec<String>>,
}

impl Probe {
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

// ===== TEST COMPONENTS =====

#[derive(Debug)]
pub struct MemoryStore {
    name: String,
}

impl PersistentStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
struct Entities;

impl EntityClassRegistry for Entities {
    fn entity_types(&self) -> Vec<String> {
        vec!["Order".to_string(), "Customer".to_string()]
    }
}

#[derive(Debug)]
struct SessionAudit;

impl EntityLifeCycle for SessionAudit {
    fn name(&self) -> &str {
        "session-audit"
    }

    fn as_session_listener(self: Arc<Self>) -> Option<Arc<dyn SessionListener>> {
        Some(self)
    }
}

impl SessionListener for SessionAudit {}

#[derive(Debug)]
struct ChangeLog;

impl EntityLifeCycle for ChangeLog {
    fn name(&self) -> &str {
        "change-log"
    }
}

#[derive(Debug)]
pub struct TestEngine {
    fail_listeners: bool,
}

impl AppEngine for TestEngine {
    fn name(&self) -> &str {
        "test-engine"
    }

    fn initialize_lifecycle_listeners(&self) -> Result<Vec<Arc<dyn EntityLifeCycle>>, BoxError> {
        if self.fail_listeners {
            return Err("listener table is corrupt".into());
        }
        Ok(vec![Arc::new(SessionAudit), Arc::new(ChangeLog)])
    }
}

#[derive(Debug, Default)]
struct OverridingProperties {
    engine: Mutex<Option<Arc<dyn AppEngine>>>,
}

impl PropertyManager for OverridingProperties {
    fn set_app_engine(&self, engine: Arc<dyn AppEngine>) {
        *self.engine.lock() = Some(engine);
    }

    fn properties(&self) -> Result<BTreeMap<String, String>, BoxError> {
        if self.engine.lock().is_none() {
            return Err("engine not set".into());
        }
        let mut properties = BTreeMap::new();
        properties.insert("app.http.domain".to_string(), "managed.example.test".to_string());
        properties.insert("app.mode".to_string(), "live".to_string());
        Ok(properties)
    }
}

#[derive(Debug)]
struct RecordingBinding {
    probe: Arc<Probe>,
}

impl BindingComponent for RecordingBinding {
    fn name(&self) -> &str {
        "recording-binding"
    }

    fn set_context(&self, context: BindingContext) -> Result<(), BoxError> {
        self.probe
            .generator_at_binding
            .lock()
            .push(context.session_manager.uid_generator().is_some());
        self.probe.binding_contexts.lock().push(context);
        Ok(())
    }
}

#[derive(Debug)]
struct Guards;

impl SecurityGuardChain for Guards {
    fn guards(&self) -> Vec<String> {
        vec!["authenticated".to_string()]
    }
}

/// Service with start/stop hooks that land in the probe.
pub struct HookedService {
    name: &'static str,
    probe: Arc<Probe>,
    fail_stop: bool,
}

#[async_trait]
impl AppService for HookedService {
    async fn start(&self) -> Result<(), BoxError> {
        self.probe.record(format!("start:{}", self.name));
        Ok(())
    }

    async fn stop(&self) -> Result<(), BoxError> {
        self.probe.record(format!("stop:{}", self.name));
        if self.fail_stop {
            return Err(format!("{} refused to stop", self.name).into());
        }
        Ok(())
    }
}

fn hooked(name: &'static str, probe: &Arc<Probe>, fail_stop: bool) -> Instance {
    let service = Arc::new(HookedService {
        name,
        probe: Arc::clone(probe),
        fail_stop,
    });
    Instance::new(Arc::clone(&service)).with_service_hook(service)
}

/// The type universe the integration tests assemble from.
pub fn test_types(probe: &Arc<Probe>) -> TypeRegistry {
    let mut types = TypeRegistry::new();

    let p = Arc::clone(probe);
    types
        .register(
            TypeDefinition::new("test::MemoryStore")
                .constructor(&["wright::AppConfig", "String"], move |args| {
                    *p.store_config.lock() = Some(args.get::<Arc<ConfigModel>>(0)?);
                    let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore {
                        name: args.get::<String>(1)?,
                    });
                    *p.store.lock() = Some(Arc::clone(&store));
                    Ok(Instance::new(store))
                })
                .constructor(&[], |_| {
                    let store: Arc<dyn PersistentStore> = Arc::new(MemoryStore {
                        name: "default".to_string(),
                    });
                    Ok(Instance::new(store))
                }),
        )
        .unwrap();

    types
        .register(TypeDefinition::new("test::Entities").constructor(&[], |_| {
            let registry: Arc<dyn EntityClassRegistry> = Arc::new(Entities);
            Ok(Instance::new(registry))
        }))
        .unwrap();

    let p = Arc::clone(probe);
    types
        .register(TypeDefinition::new("test::Engine").constructor(
            &[
                "wright::AppConfig",
                "wright::AppContext",
                "wright::PersistentStore",
                "wright::ServiceManager",
            ],
            move |args| {
                let config = args.get::<Arc<ConfigModel>>(0)?;
                let _context = args.get::<Arc<dyn AppContext>>(1)?;
                *p.engine_store.lock() = Some(args.get::<Arc<dyn PersistentStore>>(2)?);
                let _services = args.get::<Arc<dyn ServiceManager>>(3)?;
                let engine: Arc<dyn AppEngine> = Arc::new(TestEngine {
                    fail_listeners: config.property("test.fail_listeners").as_deref() == Some("true"),
                });
                Ok(Instance::new(engine))
            },
        ))
        .unwrap();

    types
        .register(TypeDefinition::new("test::Properties").constructor(&[], |_| {
            let manager: Arc<dyn PropertyManager> = Arc::new(OverridingProperties::default());
            Ok(Instance::new(manager))
        }))
        .unwrap();

    let p = Arc::clone(probe);
    types
        .register(TypeDefinition::new("test::Binding").constructor(&[], move |_| {
            let component: Arc<dyn BindingComponent> = Arc::new(RecordingBinding {
                probe: Arc::clone(&p),
            });
            Ok(Instance::new(component))
        }))
        .unwrap();

    types
        .register(TypeDefinition::new("test::Guards").constructor(&["wright::AppEngine"], |args| {
            let _engine = args.get::<Arc<dyn AppEngine>>(0)?;
            let chain: Arc<dyn SecurityGuardChain> = Arc::new(Guards);
            Ok(Instance::new(chain))
        }))
        .unwrap();

    let p = Arc::clone(probe);
    types
        .register(TypeDefinition::new("test::StatusService").constructor(
            &["wright::PersistentStore"],
            move |args| {
                *p.service_store.lock() = Some(args.get::<Arc<dyn PersistentStore>>(0)?);
                Ok(hooked("status", &p, false))
            },
        ))
        .unwrap();

    let p = Arc::clone(probe);
    types
        .register(TypeDefinition::new("test::AuditService").constructor(
            &["appEngine", "appConfig"],
            move |args| {
                let _engine = args.get::<Arc<dyn AppEngine>>(0)?;
                *p.audit_config.lock() = Some(args.get::<Arc<ConfigModel>>(1)?);
                Ok(hooked("audit", &p, false))
            },
        ))
        .unwrap();

    let p = Arc::clone(probe);
    types
        .register(TypeDefinition::new("test::StubbornService").constructor(
            &["appContext"],
            move |_| Ok(hooked("stubborn", &p, true)),
        ))
        .unwrap();

    let p = Arc::clone(probe);
    types
        .register(
            TypeDefinition::new("test::Heartbeat")
                .constructor(&[], move |_| {
                    p.record("constructed:heartbeat");
                    Ok(Instance::new(()))
                })
                .constructor(&["appEngine"], |_| Ok(Instance::new(()))),
        )
        .unwrap();

    types
        .register(TypeDefinition::new("test::NeedsTransactions").constructor(
            &["transactionManager"],
            |_| Ok(Instance::new(())),
        ))
        .unwrap();

    types
        .register(TypeDefinition::new("test::NeedsMailer").constructor(&["mailer"], |_| {
            Ok(Instance::new(()))
        }))
        .unwrap();

    types
}

// ===== MANIFEST FIXTURES =====

/// A complete manifest exercising every phase.
pub fn full_manifest() -> serde_json::Value {
    serde_json::json!({
        "persistent_store": {
            "type": "test::MemoryStore",
            "constructor_args": [
                { "type": "wright::AppConfig" },
                { "type": "String", "value": "primary" }
            ]
        },
        "entity_class_registry": "test::Entities",
        "engine": "test::Engine",
        "properties": {
            "app.http.port": 8080,
            "app.http.domain": "example.test",
            "app.base.url": "http://example.test:8080/shop"
        },
        "binding_components": [ { "type": "test::Binding" } ],
        "services": [
            { "name": "status", "type": "test::StatusService" },
            { "name": "heartbeat", "type": "test::Heartbeat" },
            { "name": "audit", "type": "test::AuditService" }
        ],
        "property_manager": "test::Properties",
        "security_guard_chain": "test::Guards"
    })
}

/// The smallest manifest that starts.
pub fn minimal_manifest() -> serde_json::Value {
    serde_json::json!({
        "persistent_store": { "type": "test::MemoryStore" },
        "entity_class_registry": "test::Entities",
        "engine": "test::Engine"
    })
}

pub fn write_manifest(dir: &Path, manifest: &serde_json::Value) {
    let web_inf = dir.join("WEB-INF");
    fs::create_dir_all(&web_inf).unwrap();
    fs::write(
        web_inf.join("application.json"),
        serde_json::to_string_pretty(manifest).unwrap(),
    )
    .unwrap();
}

/// Everything one integration test needs.
pub struct TestHarness {
    pub dir: TempDir,
    pub probe: Arc<Probe>,
    pub services: Arc<AppServiceManager>,
    pub server: AppServer,
}

impl TestHarness {
    pub fn new(manifest: &serde_json::Value) -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), manifest);

        let probe = Arc::new(Probe::default());
        let services = Arc::new(AppServiceManager::new());
        let context: Arc<dyn AppContext> = Arc::new(LocalAppContext::new(dir.path(), ROOT));
        let server = AppServer::new(context, test_types(&probe))
            .with_settings(ServerSettings {
                manifest_format: ManifestFormat::Json,
                ..ServerSettings::default()
            })
            .with_service_manager(services.clone());

        Self {
            dir,
            probe,
            services,
            server,
        }
    }
}
