#![cfg(test)]

use std::fs;

use crate::factory::AssemblyError;
use crate::kernel::bootstrap::AppState;
use crate::kernel::error::{Error, KernelLifecyclePhase};
use crate::manifest::ManifestError;
use crate::service::ServiceManager;

use super::common::{full_manifest, minimal_manifest, TestHarness};

fn with_services(services: serde_json::Value) -> serde_json::Value {
    let mut manifest = minimal_manifest();
    manifest["services"] = services;
    manifest
}

async fn init_failure(h: &mut TestHarness) -> Error {
    let err = h.server.init().await.expect_err("startup should fail");
    assert!(matches!(
        err,
        Error::KernelLifecycleError { phase: KernelLifecyclePhase::Initialize, .. }
    ));
    err
}

#[tokio::test]
async fn test_missing_dependency_variable_names_the_key() {
    let mut h = TestHarness::new(&with_services(serde_json::json!([
        { "name": "status", "type": "test::StatusService" },
        { "name": "mailer", "type": "test::NeedsMailer" }
    ])));

    let err = init_failure(&mut h).await;
    assert_eq!(err.failed_stage(), Some("core::service_assembly"));
    assert!(matches!(
        err.find_cause::<AssemblyError>(),
        Some(AssemblyError::MissingDependencyVariable { key }) if key == "mailer"
    ));
    assert!(err.to_string().contains("core::service_assembly"));

    // Services before the failing one were registered; none were started.
    assert!(h.services.service("status").is_some());
    assert_eq!(h.services.start_calls(), 0);
    assert_eq!(
        h.server.state(),
        &AppState::Aborted { stage_id: Some("core::service_assembly".to_string()) }
    );
    assert!(h.server.variables().is_none());
}

#[tokio::test]
async fn test_pre_init_variables_do_not_survive_rebind() {
    let mut h = TestHarness::new(&with_services(serde_json::json!([
        { "name": "ledger", "type": "test::NeedsTransactions" }
    ])));

    let err = init_failure(&mut h).await;
    assert!(matches!(
        err.find_cause::<AssemblyError>(),
        Some(AssemblyError::MissingDependencyVariable { key }) if key == "transactionManager"
    ));
    // The transaction manager is still a registered service.
    assert!(h.services.service("transactionManager").is_some());
}

#[tokio::test]
async fn test_unreadable_manifest_fails_config_load() {
    let mut h = TestHarness::new(&minimal_manifest());
    fs::remove_file(h.dir.path().join("WEB-INF/application.json")).unwrap();

    let err = init_failure(&mut h).await;
    assert_eq!(err.failed_stage(), Some("core::config_load"));
    assert!(matches!(
        err.find_cause::<ManifestError>(),
        Some(ManifestError::ManifestUnreadable { .. })
    ));
    assert!(h.server.config().is_none());
}

#[tokio::test]
async fn test_lifecycle_listener_failure() {
    let mut manifest = minimal_manifest();
    manifest["properties"] = serde_json::json!({ "test.fail_listeners": true });
    let mut h = TestHarness::new(&manifest);

    let err = init_failure(&mut h).await;
    assert_eq!(err.failed_stage(), Some("core::lifecycle_listener_init"));
    let cause = err.find_cause::<AssemblyError>().unwrap();
    assert!(matches!(cause, AssemblyError::LifecycleListenerInitFailure { .. }));
    assert!(cause.to_string().contains("listener table is corrupt"));
}

#[tokio::test]
async fn test_unknown_engine_type() {
    let mut manifest = minimal_manifest();
    manifest["engine"] = serde_json::json!("test::Missing");
    let mut h = TestHarness::new(&manifest);

    let err = init_failure(&mut h).await;
    assert_eq!(err.failed_stage(), Some("core::engine_init"));
    assert!(matches!(
        err.find_cause::<AssemblyError>(),
        Some(AssemblyError::TypeResolutionFailure { type_id }) if type_id == "test::Missing"
    ));
    // Nothing after the failed phase ran.
    assert!(h.probe.binding_contexts.lock().is_empty());
    assert_eq!(h.services.start_calls(), 0);
}

#[tokio::test]
async fn test_no_matching_store_constructor() {
    let mut manifest = minimal_manifest();
    manifest["persistent_store"]["constructor_args"] =
        serde_json::json!([{ "type": "i32", "value": 3 }]);
    let mut h = TestHarness::new(&manifest);

    let err = init_failure(&mut h).await;
    assert_eq!(err.failed_stage(), Some("core::persistent_store_init"));
    assert!(matches!(
        err.find_cause::<AssemblyError>(),
        Some(AssemblyError::ConstructorSelectionFailure { type_id, .. }) if type_id == "test::MemoryStore"
    ));
}

#[tokio::test]
async fn test_non_numeric_port_fails_port_binding() {
    let mut manifest = full_manifest();
    manifest["properties"]["app.http.port"] = serde_json::json!("eighty");
    let mut h = TestHarness::new(&manifest);

    let err = init_failure(&mut h).await;
    assert_eq!(err.failed_stage(), Some("core::port_binding"));
    assert!(matches!(
        err.find_cause::<AssemblyError>(),
        Some(AssemblyError::InvalidProperty { key, .. }) if key == "app.http.port"
    ));
    assert!(h.probe.store.lock().is_none());
}
