use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::factory::error::{AssemblyError, BoxError};
use crate::kernel::component::Instance;

/// Constructor body: receives the resolved arguments, returns the new instance.
pub type ConstructorFn = Arc<dyn Fn(Arguments) -> Result<Instance, BoxError> + Send + Sync>;

/// Positional arguments handed to a constructor body.
#[derive(Debug)]
pub struct Arguments {
    type_id: String,
    values: Vec<Instance>,
}

impl Arguments {
    pub(crate) fn new(type_id: &str, values: Vec<Instance>) -> Self {
        Self {
            type_id: type_id.to_string(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the raw instance at `index`.
    pub fn instance(&self, index: usize) -> Option<&Instance> {
        self.values.get(index)
    }

    /// Clone the argument at `index` out as `T`.
    pub fn get<T: Any + Send + Sync + Clone>(&self, index: usize) -> Result<T, AssemblyError> {
        let instance = self.values.get(index).ok_or_else(|| {
            AssemblyError::ConstructorSelectionFailure {
                type_id: self.type_id.clone(),
                reason: format!(
                    "argument {} requested but only {} supplied",
                    index,
                    self.values.len()
                ),
            }
        })?;
        instance
            .downcast::<T>()
            .ok_or_else(|| AssemblyError::TypeMismatch {
                type_id: format!("{}[{}]", self.type_id, index),
                expected: type_name::<T>(),
            })
    }
}

/// One constructor of a registered type: its formal parameter types, in order,
/// and the body that builds the instance.
#[derive(Clone)]
pub struct ConstructorSpec {
    params: Vec<String>,
    invoke: ConstructorFn,
}

impl ConstructorSpec {
    pub fn new<F>(params: &[&str], body: F) -> Self
    where
        F: Fn(Arguments) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self {
            params: params.iter().map(|p| p.to_string()).collect(),
            invoke: Arc::new(body),
        }
    }

    /// Formal parameter type identifiers
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Whether the formal parameters equal `types` exactly, in order.
    pub fn matches<S: AsRef<str>>(&self, types: &[S]) -> bool {
        self.params.len() == types.len()
            && self
                .params
                .iter()
                .zip(types)
                .all(|(param, ty)| param == ty.as_ref())
    }

    /// Human-readable signature, e.g. `(wright::AppConfig, String)`.
    pub fn signature(&self) -> String {
        format!("({})", self.params.join(", "))
    }

    /// Run the constructor body. `values` must line up with `params`.
    pub(crate) fn invoke(&self, type_id: &str, values: Vec<Instance>) -> Result<Instance, AssemblyError> {
        (self.invoke)(Arguments::new(type_id, values)).map_err(|source| {
            AssemblyError::ConstructorInvocationFailure {
                type_id: type_id.to_string(),
                source,
            }
        })
    }
}

impl fmt::Debug for ConstructorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorSpec")
            .field("params", &self.params)
            .finish()
    }
}

/// A constructible type: an identifier and its constructors in declaration order.
#[derive(Debug, Clone)]
pub struct TypeDefinition {
    type_id: String,
    constructors: Vec<ConstructorSpec>,
}

impl TypeDefinition {
    pub fn new(type_id: impl Into<String>) -> Self {
        Self {
            type_id: type_id.into(),
            constructors: Vec::new(),
        }
    }

    /// Declare a constructor. Declaration order is preserved and is the order
    /// implicit resolution picks from.
    pub fn constructor<F>(mut self, params: &[&str], body: F) -> Self
    where
        F: Fn(Arguments) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        self.constructors.push(ConstructorSpec::new(params, body));
        self
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn constructors(&self) -> &[ConstructorSpec] {
        &self.constructors
    }

    /// The first declared constructor.
    pub fn first_constructor(&self) -> Option<&ConstructorSpec> {
        self.constructors.first()
    }

    /// The zero-argument constructor, if declared.
    pub fn default_constructor(&self) -> Option<&ConstructorSpec> {
        self.constructors.iter().find(|c| c.arity() == 0)
    }

    /// The constructor whose parameters equal `types` exactly.
    pub fn exact_constructor<S: AsRef<str>>(&self, types: &[S]) -> Option<&ConstructorSpec> {
        self.constructors.iter().find(|c| c.matches(types))
    }
}

/// Registry mapping type identifiers to their definitions.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDefinition>,
}

impl TypeRegistry {
    /// Create a new empty type registry
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Register a type definition
    pub fn register(&mut self, definition: TypeDefinition) -> Result<(), AssemblyError> {
        let type_id = definition.type_id().to_string();

        if self.types.contains_key(&type_id) {
            return Err(AssemblyError::TypeAlreadyRegistered { type_id });
        }

        log::debug!(
            "Registered type {} with {} constructor(s)",
            type_id,
            definition.constructors().len()
        );
        self.types.insert(type_id, definition);
        Ok(())
    }

    /// Look up a type definition by identifier.
    pub fn resolve(&self, type_id: &str) -> Result<&TypeDefinition, AssemblyError> {
        self.types
            .get(type_id)
            .ok_or_else(|| AssemblyError::TypeResolutionFailure {
                type_id: type_id.to_string(),
            })
    }

    pub fn has_type(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    /// All registered type identifiers, sorted.
    pub fn type_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.types.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn count(&self) -> usize {
        self.types.len()
    }
}
