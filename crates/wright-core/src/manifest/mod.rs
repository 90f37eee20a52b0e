//! # Wright Core Manifest
//!
//! The parsed, declarative description of what to assemble: the
//! [`ConfigModel`]. Everything in it is immutable after parsing except the
//! [`PropertyMap`], which the property-merge phase writes into.
//!
//! The textual syntax is not fixed. [`parser::SerdeManifestParser`] reads
//! JSON, YAML and TOML; hosts can plug in any other
//! [`ManifestParser`](parser::ManifestParser).
pub mod error;
pub mod format;
pub mod parser;

use std::collections::{BTreeMap, HashSet};

use parking_lot::RwLock;
use serde::de::{self, Deserializer};
use serde::Deserialize;

use crate::kernel::constants;

pub use error::ManifestError;
pub use format::ManifestFormat;
pub use parser::{ManifestParser, SerdeManifestParser};

/// The value side of a constructor argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Substitute the live configuration object
    CurrentConfig,
    /// A literal, converted according to the declared type
    Literal(serde_json::Value),
}

/// One declared argument of the persistent store's constructor.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawConstructorArg")]
pub struct ConstructorArgDescriptor {
    type_id: String,
    value: ArgValue,
}

#[derive(Deserialize)]
struct RawConstructorArg {
    #[serde(rename = "type")]
    type_id: String,
    #[serde(default)]
    value: Option<serde_json::Value>,
}

impl TryFrom<RawConstructorArg> for ConstructorArgDescriptor {
    type Error = String;

    fn try_from(raw: RawConstructorArg) -> Result<Self, Self::Error> {
        // An argument declared with the configuration type is the marker.
        if raw.type_id == constants::APP_CONFIG_TYPE {
            return Ok(Self::current_config());
        }
        match raw.value {
            Some(value) => Ok(Self::literal(raw.type_id, value)),
            None => Err(format!(
                "constructor argument of type '{}' has no value",
                raw.type_id
            )),
        }
    }
}

impl ConstructorArgDescriptor {
    pub fn literal(type_id: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            type_id: type_id.into(),
            value: ArgValue::Literal(value.into()),
        }
    }

    /// The "substitute the live configuration" marker.
    pub fn current_config() -> Self {
        Self {
            type_id: constants::APP_CONFIG_TYPE.to_string(),
            value: ArgValue::CurrentConfig,
        }
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn value(&self) -> &ArgValue {
        &self.value
    }

    pub fn is_current_config(&self) -> bool {
        matches!(self.value, ArgValue::CurrentConfig)
    }
}

/// Persistent-store type plus its ordered constructor arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersistentStoreDescriptor {
    #[serde(rename = "type")]
    pub type_id: String,
    #[serde(default)]
    pub constructor_args: Vec<ConstructorArgDescriptor>,
}

impl PersistentStoreDescriptor {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            constructor_args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: ConstructorArgDescriptor) -> Self {
        self.constructor_args.push(arg);
        self
    }
}

/// A named service to assemble.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_id: String,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, type_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_id: type_id.into(),
        }
    }
}

/// A binding component to install.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BindingComponentDescriptor {
    #[serde(rename = "type")]
    pub type_id: String,
}

impl BindingComponentDescriptor {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
        }
    }
}

/// String properties of the manifest.
///
/// Interior-mutable so the property-merge phase can write into the shared
/// configuration after it has been handed to collaborators.
#[derive(Debug, Default)]
pub struct PropertyMap {
    entries: RwLock<BTreeMap<String, String>>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    /// Insert or overwrite a property, returning the previous value.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.write().insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().contains_key(key)
    }

    /// A point-in-time copy of all properties, ordered by key.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Clone for PropertyMap {
    fn clone(&self) -> Self {
        Self::from(self.snapshot())
    }
}

impl From<BTreeMap<String, String>> for PropertyMap {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }
}

impl<'de> Deserialize<'de> for PropertyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut entries = BTreeMap::new();
        for (key, value) in raw {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(de::Error::custom(format!(
                        "property '{}' must be a string, number or boolean, got {}",
                        key, other
                    )));
                }
            };
            entries.insert(key, value);
        }
        Ok(Self::from(entries))
    }
}

/// The parsed manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigModel {
    persistent_store: PersistentStoreDescriptor,
    entity_class_registry: String,
    engine: String,
    #[serde(default)]
    properties: PropertyMap,
    #[serde(default)]
    binding_components: Vec<BindingComponentDescriptor>,
    #[serde(default)]
    services: Vec<ServiceDescriptor>,
    #[serde(default)]
    property_manager: Option<String>,
    #[serde(default)]
    security_guard_chain: Option<String>,
}

impl ConfigModel {
    /// Create a model with the three mandatory type identifiers.
    pub fn new(
        persistent_store: PersistentStoreDescriptor,
        entity_class_registry: impl Into<String>,
        engine: impl Into<String>,
    ) -> Self {
        Self {
            persistent_store,
            entity_class_registry: entity_class_registry.into(),
            engine: engine.into(),
            properties: PropertyMap::new(),
            binding_components: Vec::new(),
            services: Vec::new(),
            property_manager: None,
            security_guard_chain: None,
        }
    }

    pub fn with_property(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key, value);
        self
    }

    pub fn with_service(mut self, service: ServiceDescriptor) -> Self {
        self.services.push(service);
        self
    }

    pub fn with_binding_component(mut self, component: BindingComponentDescriptor) -> Self {
        self.binding_components.push(component);
        self
    }

    pub fn with_property_manager(mut self, type_id: impl Into<String>) -> Self {
        self.property_manager = Some(type_id.into());
        self
    }

    pub fn with_security_guard_chain(mut self, type_id: impl Into<String>) -> Self {
        self.security_guard_chain = Some(type_id.into());
        self
    }

    pub fn persistent_store(&self) -> &PersistentStoreDescriptor {
        &self.persistent_store
    }

    pub fn entity_class_registry(&self) -> &str {
        &self.entity_class_registry
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// Get a property value
    pub fn property(&self, key: &str) -> Option<String> {
        self.properties.get(key)
    }

    pub fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    pub fn binding_components(&self) -> &[BindingComponentDescriptor] {
        &self.binding_components
    }

    pub fn services(&self) -> &[ServiceDescriptor] {
        &self.services
    }

    pub fn property_manager(&self) -> Option<&str> {
        self.property_manager.as_deref()
    }

    pub fn security_guard_chain(&self) -> Option<&str> {
        self.security_guard_chain.as_deref()
    }

    /// Structural checks the deserializer cannot express.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mandatory = [
            ("persistent_store.type", self.persistent_store.type_id.as_str()),
            ("entity_class_registry", self.entity_class_registry.as_str()),
            ("engine", self.engine.as_str()),
        ];
        for (entry, type_id) in mandatory {
            if type_id.trim().is_empty() {
                return Err(ManifestError::InvalidEntry {
                    entry: entry.to_string(),
                    reason: "type identifier is empty".to_string(),
                });
            }
        }

        let mut names = HashSet::new();
        for service in &self.services {
            if service.name.trim().is_empty() {
                return Err(ManifestError::InvalidEntry {
                    entry: format!("services[{}]", service.type_id),
                    reason: "service name is empty".to_string(),
                });
            }
            if !names.insert(service.name.as_str()) {
                return Err(ManifestError::InvalidEntry {
                    entry: format!("services[{}]", service.name),
                    reason: "service name declared more than once".to_string(),
                });
            }
        }
        Ok(())
    }
}
