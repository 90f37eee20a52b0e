//! # Wright Core Component Factory
//!
//! Builds instances of registered types by identifier.
//!
//! Types are declared up front in a [`TypeRegistry`]: each identifier maps to
//! its constructors in declaration order, every constructor naming the type
//! identifiers of its parameters. The [`ComponentFactory`] picks a
//! constructor and supplies its arguments in one of two ways:
//!
//! - **explicit**: the manifest lists the argument types and values; the
//!   constructor whose parameters equal those types exactly is chosen.
//! - **implicit**: the first declared constructor is chosen and each of its
//!   parameter types is looked up as a published variable.
pub mod error;
pub mod registry;

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use crate::kernel::component::{Instance, VariableLookup};
use crate::manifest::{ArgValue, ConfigModel, ConstructorArgDescriptor};

pub use error::{AssemblyError, BoxError};
pub use registry::{Arguments, ConstructorFn, ConstructorSpec, TypeDefinition, TypeRegistry};

/// Literal type identifiers an explicit constructor argument may declare.
pub const LITERAL_TYPES: &[&str] = &["String", "bool", "i32", "i64", "u16", "u32", "u64", "f64"];

/// How the arguments of a construction are obtained.
#[derive(Debug, Clone, Copy)]
pub enum ArgSpec<'a> {
    /// Arguments declared in the manifest
    Explicit {
        args: &'a [ConstructorArgDescriptor],
        config: &'a Arc<ConfigModel>,
    },
    /// Arguments resolved from published variables
    Implicit,
}

/// Constructs registered types.
#[derive(Debug, Clone, Default)]
pub struct ComponentFactory {
    types: TypeRegistry,
}

impl ComponentFactory {
    pub fn new(types: TypeRegistry) -> Self {
        Self { types }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Construct `type_id` with arguments obtained per `spec`.
    pub fn construct(
        &self,
        type_id: &str,
        spec: ArgSpec<'_>,
        variables: &dyn VariableLookup,
    ) -> Result<Instance, AssemblyError> {
        match spec {
            ArgSpec::Explicit { args, config } => self.construct_explicit(type_id, args, config),
            ArgSpec::Implicit => self.construct_implicit(type_id, variables),
        }
    }

    /// Construct with manifest-declared arguments, selecting the constructor
    /// whose parameter types equal the declared types in order.
    pub fn construct_explicit(
        &self,
        type_id: &str,
        args: &[ConstructorArgDescriptor],
        config: &Arc<ConfigModel>,
    ) -> Result<Instance, AssemblyError> {
        let definition = self.types.resolve(type_id)?;

        let mut formal = Vec::with_capacity(args.len());
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            formal.push(arg.type_id());
            values.push(match arg.value() {
                ArgValue::CurrentConfig => Instance::new(Arc::clone(config)),
                ArgValue::Literal(value) => convert_literal(arg.type_id(), value)?,
            });
        }

        let constructor = definition.exact_constructor(&formal).ok_or_else(|| {
            AssemblyError::ConstructorSelectionFailure {
                type_id: type_id.to_string(),
                reason: format!("no constructor takes ({})", formal.join(", ")),
            }
        })?;

        log::debug!("Constructing {} via {}", type_id, constructor.signature());
        constructor.invoke(type_id, values)
    }

    /// Construct with the first declared constructor, resolving every
    /// parameter type identifier from `variables`.
    pub fn construct_implicit(
        &self,
        type_id: &str,
        variables: &dyn VariableLookup,
    ) -> Result<Instance, AssemblyError> {
        let constructor = self.implicit_constructor(type_id)?;
        let values = constructor
            .params()
            .iter()
            .map(|param| variables.lookup(param))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("Constructing {} via {}", type_id, constructor.signature());
        constructor.invoke(type_id, values)
    }

    /// The constructor implicit construction would use.
    pub fn implicit_constructor(&self, type_id: &str) -> Result<&ConstructorSpec, AssemblyError> {
        self.types
            .resolve(type_id)?
            .first_constructor()
            .ok_or_else(|| AssemblyError::ConstructorSelectionFailure {
                type_id: type_id.to_string(),
                reason: "type declares no constructor".to_string(),
            })
    }

    /// Construct with the zero-argument constructor.
    pub fn construct_default(&self, type_id: &str) -> Result<Instance, AssemblyError> {
        let constructor = self
            .types
            .resolve(type_id)?
            .default_constructor()
            .ok_or_else(|| AssemblyError::ConstructorSelectionFailure {
                type_id: type_id.to_string(),
                reason: "no zero-argument constructor".to_string(),
            })?;
        constructor.invoke(type_id, Vec::new())
    }

    /// Construct with caller-supplied `(type identifier, value)` pairs; the
    /// constructor must take exactly those types in that order.
    pub fn construct_exact(
        &self,
        type_id: &str,
        args: Vec<(&str, Instance)>,
    ) -> Result<Instance, AssemblyError> {
        let (formal, values): (Vec<&str>, Vec<Instance>) = args.into_iter().unzip();
        let constructor = self
            .types
            .resolve(type_id)?
            .exact_constructor(&formal)
            .ok_or_else(|| AssemblyError::ConstructorSelectionFailure {
                type_id: type_id.to_string(),
                reason: format!("no constructor takes ({})", formal.join(", ")),
            })?;
        constructor.invoke(type_id, values)
    }
}

/// Convert a manifest literal to the value of its declared type.
fn convert_literal(type_id: &str, value: &serde_json::Value) -> Result<Instance, AssemblyError> {
    match type_id {
        "String" => Ok(Instance::new(scalar_text(type_id, value)?)),
        "bool" => parse_literal::<bool>(type_id, value).map(Instance::new),
        "i32" => parse_literal::<i32>(type_id, value).map(Instance::new),
        "i64" => parse_literal::<i64>(type_id, value).map(Instance::new),
        "u16" => parse_literal::<u16>(type_id, value).map(Instance::new),
        "u32" => parse_literal::<u32>(type_id, value).map(Instance::new),
        "u64" => parse_literal::<u64>(type_id, value).map(Instance::new),
        "f64" => parse_literal::<f64>(type_id, value).map(Instance::new),
        _ => Err(AssemblyError::InvalidLiteral {
            type_id: type_id.to_string(),
            value: value.to_string(),
            reason: format!("literal types are {}", LITERAL_TYPES.join(", ")),
        }),
    }
}

fn scalar_text(type_id: &str, value: &serde_json::Value) -> Result<String, AssemblyError> {
    match value {
        serde_json::Value::String(s) => Ok(s.clone()),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Bool(b) => Ok(b.to_string()),
        other => Err(AssemblyError::InvalidLiteral {
            type_id: type_id.to_string(),
            value: other.to_string(),
            reason: "not a scalar".to_string(),
        }),
    }
}

fn parse_literal<T>(type_id: &str, value: &serde_json::Value) -> Result<T, AssemblyError>
where
    T: FromStr,
    T::Err: Display,
{
    let text = scalar_text(type_id, value)?;
    text.trim()
        .parse::<T>()
        .map_err(|e| AssemblyError::InvalidLiteral {
            type_id: type_id.to_string(),
            value: text.clone(),
            reason: e.to_string(),
        })
}
