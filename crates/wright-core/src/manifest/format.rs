use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Supported manifest encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ManifestFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ManifestFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ManifestFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ManifestFormat::Toml => "toml",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(ManifestFormat::Json),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Some(ManifestFormat::Yaml),
            #[cfg(feature = "toml-config")]
            "toml" => Some(ManifestFormat::Toml),
            _ => None,
        }
    }
}

#[cfg(feature = "toml-config")]
impl Default for ManifestFormat {
    fn default() -> Self {
        ManifestFormat::Toml
    }
}

#[cfg(not(feature = "toml-config"))]
impl Default for ManifestFormat {
    fn default() -> Self {
        ManifestFormat::Json
    }
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ManifestFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_extension(s).ok_or_else(|| format!("unsupported manifest format '{}'", s))
    }
}
