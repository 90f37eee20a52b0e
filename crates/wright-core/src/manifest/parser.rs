use std::fmt;
use std::io::Read;

use crate::manifest::error::ManifestError;
use crate::manifest::{ConfigModel, ManifestFormat};

/// Turns manifest bytes into a [`ConfigModel`].
pub trait ManifestParser: Send + Sync + fmt::Debug {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Parse and validate a whole manifest from `input`.
    fn parse(&self, input: &mut dyn Read) -> Result<ConfigModel, ManifestError>;
}

/// Parser backed by serde, one instance per encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeManifestParser {
    format: ManifestFormat,
}

impl SerdeManifestParser {
    pub fn new(format: ManifestFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> ManifestFormat {
        self.format
    }

    /// Parse a manifest already held in memory.
    pub fn parse_str(&self, data: &str) -> Result<ConfigModel, ManifestError> {
        let model: ConfigModel = match self.format {
            ManifestFormat::Json => serde_json::from_str(data).map_err(|e| self.parse_error(e))?,
            #[cfg(feature = "yaml-config")]
            ManifestFormat::Yaml => serde_yaml::from_str(data).map_err(|e| self.parse_error(e))?,
            #[cfg(feature = "toml-config")]
            ManifestFormat::Toml => toml::from_str(data).map_err(|e| self.parse_error(e))?,
        };
        model.validate()?;
        Ok(model)
    }

    fn parse_error<E>(&self, source: E) -> ManifestError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ManifestError::Parse {
            format: self.format.to_string(),
            source: Box::new(source),
        }
    }
}

impl ManifestParser for SerdeManifestParser {
    fn name(&self) -> &str {
        self.format.extension()
    }

    fn parse(&self, input: &mut dyn Read) -> Result<ConfigModel, ManifestError> {
        let mut data = String::new();
        input.read_to_string(&mut data)?;
        self.parse_str(&data)
    }
}
