/// Application name
pub const APP_NAME: &str = "wright";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current plugin API version
pub const API_VERSION: &str = "0.1.0";

// --- Manifest location ---

/// Directory (relative to the application root) holding the manifest
pub const MANIFEST_DIR: &str = "WEB-INF";

/// Manifest file stem; the extension follows the manifest format
pub const MANIFEST_FILE_STEM: &str = "application";

// --- Well-known property keys ---

/// Port of the application's http listener
pub const APP_HTTP_PORT_KEY: &str = "app.http.port";

/// Domain the application is served under
pub const APP_HTTP_DOMAIN_KEY: &str = "app.http.domain";

/// Externally visible base URL of the application
pub const APP_BASE_URL_KEY: &str = "app.base.url";

// --- Type identifiers of the kernel-provided values ---

/// The parsed manifest (`Arc<ConfigModel>`)
pub const APP_CONFIG_TYPE: &str = "wright::AppConfig";

/// The context collaborator (`Arc<dyn AppContext>`)
pub const APP_CONTEXT_TYPE: &str = "wright::AppContext";

/// The application engine (`Arc<dyn AppEngine>`)
pub const APP_ENGINE_TYPE: &str = "wright::AppEngine";

/// The persistent store (`Arc<dyn PersistentStore>`)
pub const PERSISTENT_STORE_TYPE: &str = "wright::PersistentStore";

/// The service registry (`Arc<dyn ServiceManager>`)
pub const SERVICE_MANAGER_TYPE: &str = "wright::ServiceManager";

/// The server-owned transaction manager (`Arc<TransactionManager>`)
pub const TRANSACTION_MANAGER_TYPE: &str = "wright::TransactionManager";

// --- Variable aliases published after initialization ---

pub const APP_CONFIG_ALIAS: &str = "appConfig";
pub const APP_CONTEXT_ALIAS: &str = "appContext";
pub const APP_ENGINE_ALIAS: &str = "appEngine";
pub const PERSISTENT_STORE_ALIAS: &str = "persistentStore";

// --- Well-known service names ---

pub const SERVICE_TRANSACTION_MANAGER: &str = "transactionManager";
pub const SERVICE_MESSAGE_SENDER: &str = "messageSender";
pub const SERVICE_SMS_SENDER: &str = "smsSender";

/// Default SMS endpoint. `{0}` is the mobile number, `{1}` the message text.
pub const DEFAULT_SMS_ENDPOINT_TEMPLATE: &str =
    "https://sms.example.invalid/api/send?mobile={0}&message={1}";

/// Default application root (context path) of a stand-alone server
pub const DEFAULT_APPLICATION_ROOT: &str = "/";
