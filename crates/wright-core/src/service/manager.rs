use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::app::AppEngine;
use crate::factory::error::BoxError;
use crate::kernel::component::Instance;
use crate::service::error::ServiceError;

/// Start/stop hooks of a registered service.
#[async_trait]
pub trait AppService: Send + Sync {
    async fn start(&self) -> Result<(), BoxError>;

    async fn stop(&self) -> Result<(), BoxError>;
}

/// Registry of named application services and application properties.
#[async_trait]
pub trait ServiceManager: Send + Sync + Debug {
    /// Register `service` under `name`, returning the one it replaced.
    fn add_service(&self, name: &str, service: Instance) -> Option<Instance>;

    fn service(&self, name: &str) -> Option<Instance>;

    /// Registered names in registration order.
    fn service_names(&self) -> Vec<String>;

    fn add_app_property(&self, key: &str, value: &str);

    fn app_property(&self, key: &str) -> Option<String>;

    /// Bind the registry to its application.
    fn set_context(&self, application_root: &str, engine: Arc<dyn AppEngine>);

    fn application_root(&self) -> Option<String>;

    fn engine(&self) -> Option<Arc<dyn AppEngine>>;

    /// Run every service's start hook in registration order.
    async fn start_services(&self) -> Result<(), ServiceError>;

    /// Run every service's stop hook in reverse registration order.
    async fn stop_services(&self) -> Result<(), ServiceError>;
}

/// Default in-process [`ServiceManager`].
#[derive(Debug, Default)]
pub struct AppServiceManager {
    services: RwLock<Vec<(String, Instance)>>,
    properties: RwLock<BTreeMap<String, String>>,
    context: RwLock<Option<(String, Arc<dyn AppEngine>)>>,
    started: AtomicBool,
    start_calls: AtomicUsize,
}

impl AppServiceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many times `start_services` has been called.
    pub fn start_calls(&self) -> usize {
        self.start_calls.load(Ordering::SeqCst)
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn app_properties(&self) -> BTreeMap<String, String> {
        self.properties.read().clone()
    }

    fn snapshot(&self) -> Vec<(String, Instance)> {
        self.services.read().clone()
    }
}

#[async_trait]
impl ServiceManager for AppServiceManager {
    fn add_service(&self, name: &str, service: Instance) -> Option<Instance> {
        let mut services = self.services.write();
        if let Some(slot) = services.iter_mut().find(|(n, _)| n == name) {
            log::warn!("Service '{}' registered twice; replacing", name);
            return Some(std::mem::replace(&mut slot.1, service));
        }
        log::debug!("Registered service '{}' ({})", name, service.type_name());
        services.push((name.to_string(), service));
        None
    }

    fn service(&self, name: &str) -> Option<Instance> {
        self.services
            .read()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, s)| s.clone())
    }

    fn service_names(&self) -> Vec<String> {
        self.services.read().iter().map(|(n, _)| n.clone()).collect()
    }

    fn add_app_property(&self, key: &str, value: &str) {
        self.properties.write().insert(key.to_string(), value.to_string());
    }

    fn app_property(&self, key: &str) -> Option<String> {
        self.properties.read().get(key).cloned()
    }

    fn set_context(&self, application_root: &str, engine: Arc<dyn AppEngine>) {
        *self.context.write() = Some((application_root.to_string(), engine));
    }

    fn application_root(&self) -> Option<String> {
        self.context.read().as_ref().map(|(root, _)| root.clone())
    }

    fn engine(&self) -> Option<Arc<dyn AppEngine>> {
        self.context.read().as_ref().map(|(_, engine)| Arc::clone(engine))
    }

    async fn start_services(&self) -> Result<(), ServiceError> {
        self.start_calls.fetch_add(1, Ordering::SeqCst);
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(ServiceError::AlreadyStarted);
        }

        for (name, service) in self.snapshot() {
            if let Some(hook) = service.service_hook() {
                hook.start()
                    .await
                    .map_err(|source| ServiceError::StartFailed { name: name.clone(), source })?;
                log::info!("Started service '{}'", name);
            }
        }
        Ok(())
    }

    async fn stop_services(&self) -> Result<(), ServiceError> {
        if !self.started.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        let mut first_error = None;
        for (name, service) in self.snapshot().into_iter().rev() {
            if let Some(hook) = service.service_hook() {
                match hook.stop().await {
                    Ok(()) => log::info!("Stopped service '{}'", name),
                    Err(source) => {
                        log::error!("Service '{}' failed to stop: {}", name, source);
                        first_error.get_or_insert(ServiceError::StopFailed { name, source });
                    }
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
