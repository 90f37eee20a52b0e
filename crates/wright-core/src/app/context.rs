use std::fmt::Debug;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::app::session::{SequentialUidGenerator, UidGenerator};
use crate::port::AppPort;
use crate::storage::{LocalStorageProvider, StorageProvider, StorageSystemError};

/// The hosting environment of an application.
pub trait AppContext: Send + Sync + Debug {
    /// Open a resource below the application root.
    fn input_stream(&self, path: &str) -> Result<Box<dyn Read + Send>, StorageSystemError>;

    /// Context path the application is served under, e.g. `/shop`
    fn application_root(&self) -> &str;

    fn uid_generator(&self) -> Arc<dyn UidGenerator>;

    /// Publish the resolved endpoints and base URL.
    fn set_app_ports(&self, http: AppPort, https: AppPort, base_url: Option<String>);

    fn http_port(&self) -> Option<AppPort>;

    fn https_port(&self) -> Option<AppPort>;

    fn app_base_url(&self) -> Option<String>;
}

#[derive(Debug, Default)]
struct PublishedPorts {
    http: Option<AppPort>,
    https: Option<AppPort>,
    base_url: Option<String>,
}

/// Context reading resources from a local directory.
#[derive(Debug)]
pub struct LocalAppContext {
    storage: Arc<dyn StorageProvider>,
    application_root: String,
    uid_generator: Arc<dyn UidGenerator>,
    ports: RwLock<PublishedPorts>,
}

impl LocalAppContext {
    /// Context whose resources live under `base_path`.
    pub fn new(base_path: impl Into<PathBuf>, application_root: impl Into<String>) -> Self {
        Self::with_storage(
            Arc::new(LocalStorageProvider::new(base_path.into())),
            application_root,
        )
    }

    /// Context over an arbitrary storage provider.
    pub fn with_storage(storage: Arc<dyn StorageProvider>, application_root: impl Into<String>) -> Self {
        Self {
            storage,
            application_root: application_root.into(),
            uid_generator: Arc::new(SequentialUidGenerator::default()),
            ports: RwLock::new(PublishedPorts::default()),
        }
    }

    pub fn with_uid_generator(mut self, generator: Arc<dyn UidGenerator>) -> Self {
        self.uid_generator = generator;
        self
    }

    pub fn storage(&self) -> &Arc<dyn StorageProvider> {
        &self.storage
    }
}

impl AppContext for LocalAppContext {
    fn input_stream(&self, path: &str) -> Result<Box<dyn Read + Send>, StorageSystemError> {
        self.storage.open_read(Path::new(path))
    }

    fn application_root(&self) -> &str {
        &self.application_root
    }

    fn uid_generator(&self) -> Arc<dyn UidGenerator> {
        Arc::clone(&self.uid_generator)
    }

    fn set_app_ports(&self, http: AppPort, https: AppPort, base_url: Option<String>) {
        let mut ports = self.ports.write();
        ports.http = Some(http);
        ports.https = Some(https);
        ports.base_url = base_url;
    }

    fn http_port(&self) -> Option<AppPort> {
        self.ports.read().http.clone()
    }

    fn https_port(&self) -> Option<AppPort> {
        self.ports.read().https.clone()
    }

    fn app_base_url(&self) -> Option<String> {
        self.ports.read().base_url.clone()
    }
}
