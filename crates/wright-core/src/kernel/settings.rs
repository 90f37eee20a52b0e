//! Host-level settings of an [`AppServer`](crate::kernel::bootstrap::AppServer).
//!
//! These are not part of the manifest: they decide *where* the manifest lives
//! and how the pre-init collaborators are configured, before any manifest
//! value is available.
use serde::{Deserialize, Serialize};

use crate::kernel::constants;
use crate::manifest::ManifestFormat;

/// Settings consumed by the startup phases that run before the manifest is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Format of the manifest; also decides its file extension
    pub manifest_format: ManifestFormat,
    /// Explicit manifest path relative to the application root.
    /// `None` means `WEB-INF/application.<ext>`.
    pub manifest_path: Option<String>,
    /// SMS endpoint template handed to the pre-init SMS sender
    pub sms_endpoint_template: String,
}

impl ServerSettings {
    /// The manifest path the config-load phase reads from.
    pub fn manifest_path(&self) -> String {
        match &self.manifest_path {
            Some(path) => path.clone(),
            None => format!(
                "{}/{}.{}",
                constants::MANIFEST_DIR,
                constants::MANIFEST_FILE_STEM,
                self.manifest_format.extension()
            ),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            manifest_format: ManifestFormat::default(),
            manifest_path: None,
            sms_endpoint_template: constants::DEFAULT_SMS_ENDPOINT_TEMPLATE.to_string(),
        }
    }
}
