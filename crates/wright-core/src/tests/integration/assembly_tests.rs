#![cfg(test)]

use std::sync::Arc;

use crate::kernel::bootstrap::AppState;
use crate::kernel::constants::*;
use crate::manifest::ConfigModel;
use crate::service::{AssemblyReport, ServiceManager};

use super::common::{full_manifest, minimal_manifest, TestHarness};

#[tokio::test]
async fn test_full_manifest_assembles_and_starts() {
    let mut h = TestHarness::new(&full_manifest());
    h.server.init().await.expect("startup should succeed");

    assert_eq!(h.server.state(), &AppState::Running);
    assert_eq!(h.services.start_calls(), 1);
    assert!(h.services.is_started());

    // Kernel services first, then the manifest's, minus the zero-arg one.
    assert_eq!(
        h.services.service_names(),
        vec!["transactionManager", "messageSender", "smsSender", "status", "audit"]
    );
    assert_eq!(
        h.server.assembly_report(),
        Some(&AssemblyReport {
            registered: vec!["status".to_string(), "audit".to_string()],
            skipped: vec!["heartbeat".to_string()],
        })
    );
    assert_eq!(h.probe.events(), vec!["start:status", "start:audit"]);
}

#[tokio::test]
async fn test_service_receives_the_persistent_store() {
    let mut h = TestHarness::new(&full_manifest());
    h.server.init().await.unwrap();

    let store = h.probe.store.lock().clone().expect("store constructed");
    let engine_store = h.probe.engine_store.lock().clone().expect("engine constructed");
    let service_store = h.probe.service_store.lock().clone().expect("service constructed");

    assert_eq!(store.name(), "primary");
    assert!(Arc::ptr_eq(&store, &engine_store));
    assert!(Arc::ptr_eq(&store, &service_store));
}

#[tokio::test]
async fn test_config_marker_substitutes_live_config() {
    let mut h = TestHarness::new(&full_manifest());
    h.server.init().await.unwrap();

    let config = h.server.config().expect("config loaded").clone();
    let store_config = h.probe.store_config.lock().clone().expect("marker substituted");
    let audit_config = h.probe.audit_config.lock().clone().expect("audit constructed");

    assert!(Arc::ptr_eq(&config, &store_config));
    assert!(Arc::ptr_eq(&config, &audit_config));
}

#[tokio::test]
async fn test_rebind_publishes_only_post_init_variables() {
    let mut h = TestHarness::new(&full_manifest());
    h.server.init().await.unwrap();

    let variables = h.server.variables().expect("variables frozen");
    assert_eq!(
        variables.keys(),
        vec![
            APP_CONFIG_ALIAS,
            APP_CONTEXT_ALIAS,
            APP_ENGINE_ALIAS,
            PERSISTENT_STORE_ALIAS,
            APP_CONFIG_TYPE,
            APP_CONTEXT_TYPE,
            APP_ENGINE_TYPE,
            PERSISTENT_STORE_TYPE,
        ]
    );
    assert!(!variables.contains(SERVICE_TRANSACTION_MANAGER));
    assert!(!variables.contains(TRANSACTION_MANAGER_TYPE));

    let by_alias = variables.get(APP_CONFIG_ALIAS).unwrap();
    let by_type = variables.get(APP_CONFIG_TYPE).unwrap();
    assert!(by_alias.ptr_eq(&by_type));
    assert!(Arc::ptr_eq(
        &variables.get_as::<Arc<ConfigModel>>(APP_CONFIG_ALIAS).unwrap(),
        h.server.config().unwrap()
    ));
}

#[tokio::test]
async fn test_property_manager_overrides_manifest() {
    let mut h = TestHarness::new(&full_manifest());
    h.server.init().await.unwrap();

    let config = h.server.config().unwrap();
    assert_eq!(config.property("app.http.domain").as_deref(), Some("managed.example.test"));
    assert_eq!(config.property("app.mode").as_deref(), Some("live"));

    // Manager values and the republished manifest values both reach the registry.
    let properties = h.services.app_properties();
    assert_eq!(properties.get("app.mode").map(String::as_str), Some("live"));
    assert_eq!(properties.get("app.http.port").map(String::as_str), Some("8080"));
    assert_eq!(
        properties.get("app.http.domain").map(String::as_str),
        Some("managed.example.test")
    );

    // Ports were bound before the merge.
    let http = h.server.app_context().http_port().unwrap();
    assert_eq!(http.domain(), Some("example.test"));
}

#[tokio::test]
async fn test_binding_components_are_wired() {
    let mut h = TestHarness::new(&full_manifest());
    h.server.init().await.unwrap();

    assert_eq!(h.server.binding_components().len(), 1);
    assert_eq!(h.server.binding_components().components()[0].name(), "recording-binding");

    let contexts = h.probe.binding_contexts.lock();
    assert_eq!(contexts.len(), 1);
    let context = &contexts[0];
    assert!(Arc::ptr_eq(&context.config, h.server.config().unwrap()));
    assert_eq!(context.engine.name(), "test-engine");
    assert_eq!(
        context.security_guard_chain.as_ref().map(|chain| chain.guards()),
        Some(vec!["authenticated".to_string()])
    );
    assert_eq!(context.entity_class_registry.entity_types().len(), 2);

    let sessions = h.server.session_manager().expect("session manager created");
    assert!(Arc::ptr_eq(&context.session_manager, sessions));
    assert_eq!(sessions.session_listeners().len(), 1);
    assert!(Arc::ptr_eq(
        &sessions.uid_generator().expect("generator installed"),
        &h.server.app_context().uid_generator()
    ));
    assert_eq!(*h.probe.generator_at_binding.lock(), vec![false]);
}

#[tokio::test]
async fn test_security_guard_chain_absent_unless_configured() {
    let mut manifest = full_manifest();
    manifest.as_object_mut().unwrap().remove("security_guard_chain");
    let mut h = TestHarness::new(&manifest);
    h.server.init().await.unwrap();

    let contexts = h.probe.binding_contexts.lock();
    assert!(contexts[0].security_guard_chain.is_none());
}

#[tokio::test]
async fn test_minimal_manifest() {
    let mut h = TestHarness::new(&minimal_manifest());
    h.server.init().await.unwrap();

    assert_eq!(h.server.state(), &AppState::Running);
    assert!(h.server.binding_components().is_empty());
    assert_eq!(
        h.services.service_names(),
        vec!["transactionManager", "messageSender", "smsSender"]
    );
    assert_eq!(h.server.assembly_report(), Some(&AssemblyReport::default()));
    assert_eq!(h.server.config().unwrap().persistent_store().type_id, "test::MemoryStore");
    assert!(h.probe.store_config.lock().is_none());
    assert_eq!(h.services.start_calls(), 1);
}

#[tokio::test]
async fn test_sessions_use_context_uid_generator() {
    let mut h = TestHarness::new(&full_manifest());
    h.server.init().await.unwrap();

    let sessions = h.server.session_manager().unwrap();
    let first = sessions.create_session().unwrap();
    let second = sessions.create_session().unwrap();
    assert_eq!(first, "uid-1");
    assert_eq!(second, "uid-2");
}

#[tokio::test]
async fn test_no_uid_generator_without_binding_components() {
    let mut h = TestHarness::new(&minimal_manifest());
    h.server.init().await.unwrap();

    assert!(h.server.binding_components().is_empty());
    let sessions = h.server.session_manager().unwrap();
    assert!(sessions.uid_generator().is_none());
    assert!(sessions.create_session().is_err());
}
