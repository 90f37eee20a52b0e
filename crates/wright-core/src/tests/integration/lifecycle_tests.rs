#![cfg(test)]

use crate::kernel::bootstrap::AppState;
use crate::kernel::error::{Error, KernelLifecyclePhase};
use crate::service::{ServiceError, ServiceManager};
use crate::stage_manager::core_stages::STARTUP_PIPELINE;
use crate::stage_manager::StageResult;

use super::common::{full_manifest, minimal_manifest, TestHarness};

#[tokio::test]
async fn test_http_port_published_to_context() {
    let mut h = TestHarness::new(&full_manifest());
    h.server.init().await.unwrap();

    let context = h.server.app_context();
    let http = context.http_port().expect("http port published");
    assert_eq!(http.port(), Some(8080));
    assert_eq!(http.app_root(), "/shop");
    assert_eq!(http.to_string(), "http://example.test:8080/shop");

    let https = context.https_port().expect("https port published");
    assert_eq!(https.protocol(), Some("https"));
    assert_eq!(https.port(), None);

    assert_eq!(
        context.app_base_url().as_deref(),
        Some("http://example.test:8080/shop")
    );
}

#[tokio::test]
async fn test_blank_port_is_unset() {
    let mut manifest = minimal_manifest();
    manifest["properties"] = serde_json::json!({ "app.http.port": "  " });
    let mut h = TestHarness::new(&manifest);
    h.server.init().await.unwrap();

    let http = h.server.app_context().http_port().unwrap();
    assert_eq!(http.port(), None);
    assert_eq!(h.server.app_context().app_base_url(), None);
}

#[tokio::test]
async fn test_second_init_is_rejected() {
    let mut h = TestHarness::new(&minimal_manifest());
    h.server.init().await.unwrap();

    let err = h.server.init().await.unwrap_err();
    assert!(matches!(
        err,
        Error::KernelLifecycleError { phase: KernelLifecyclePhase::RunPreCheck, .. }
    ));
    assert_eq!(h.server.state(), &AppState::Running);
    assert_eq!(h.services.start_calls(), 1);
}

#[tokio::test]
async fn test_plan_describes_without_constructing() {
    let h = TestHarness::new(&full_manifest());
    let plan = h.server.plan().await.unwrap();

    let ids: Vec<&str> = plan.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, STARTUP_PIPELINE.stages);
    assert!(plan.iter().all(|(_, result)| matches!(result, StageResult::Planned(_))));

    let describe = |id: &str| match plan.iter().find(|(stage, _)| stage == id) {
        Some((_, StageResult::Planned(text))) => text.clone(),
        other => panic!("unexpected plan entry: {other:?}"),
    };
    assert!(describe("core::persistent_store_init").contains("test::MemoryStore(wright::AppConfig, String)"));
    assert!(describe("core::service_assembly").contains("status, heartbeat, audit"));

    assert!(h.probe.store.lock().is_none());
    assert!(h.services.service_names().is_empty());
    assert_eq!(h.server.state(), &AppState::Created);
}

#[tokio::test]
async fn test_shutdown_stops_in_reverse_order() {
    let mut manifest = minimal_manifest();
    manifest["services"] = serde_json::json!([
        { "name": "status", "type": "test::StatusService" },
        { "name": "audit", "type": "test::AuditService" }
    ]);
    let mut h = TestHarness::new(&manifest);
    h.server.init().await.unwrap();

    let transactions = h.server.transaction_manager().clone();
    transactions.begin();
    assert_eq!(transactions.open_transactions(), 1);

    h.server.shutdown().await.unwrap();
    assert_eq!(h.server.state(), &AppState::Stopped);
    assert_eq!(
        h.probe.events(),
        vec!["start:status", "start:audit", "stop:audit", "stop:status"]
    );
    assert_eq!(transactions.open_transactions(), 0);
    assert!(!h.services.is_started());
}

#[tokio::test]
async fn test_shutdown_reports_first_stop_failure() {
    let mut manifest = minimal_manifest();
    manifest["services"] = serde_json::json!([
        { "name": "status", "type": "test::StatusService" },
        { "name": "stubborn", "type": "test::StubbornService" },
        { "name": "audit", "type": "test::AuditService" }
    ]);
    let mut h = TestHarness::new(&manifest);
    h.server.init().await.unwrap();

    let err = h.server.shutdown().await.unwrap_err();
    assert!(matches!(
        err,
        Error::KernelLifecycleError { phase: KernelLifecyclePhase::Shutdown, .. }
    ));
    assert!(matches!(
        err.find_cause::<ServiceError>(),
        Some(ServiceError::StopFailed { name, .. }) if name == "stubborn"
    ));
    // The remaining services were still stopped.
    assert_eq!(
        h.probe.events()[3..],
        ["stop:audit", "stop:stubborn", "stop:status"]
    );
    assert_eq!(h.server.state(), &AppState::Stopped);
}
