use std::sync::Arc;

use crate::factory::AssemblyError;
use crate::kernel::component::{Instance, VariableLookup, VariableRegistry};

trait Greeter: Send + Sync {
    fn greet(&self) -> String;
}

struct English;

impl Greeter for English {
    fn greet(&self) -> String {
        "hello".to_string()
    }
}

#[test]
fn test_instance_downcast_trait_object() {
    let greeter: Arc<dyn Greeter> = Arc::new(English);
    let instance = Instance::new(greeter);

    assert!(instance.is::<Arc<dyn Greeter>>());
    assert!(!instance.is::<String>());
    assert_eq!(instance.downcast::<Arc<dyn Greeter>>().unwrap().greet(), "hello");
    assert!(instance.downcast::<Arc<English>>().is_none());
}

#[test]
fn test_instance_clone_shares_value() {
    let instance = Instance::new("shared".to_string());
    let copy = instance.clone();
    let other = Instance::new("shared".to_string());

    assert!(instance.ptr_eq(&copy));
    assert!(!instance.ptr_eq(&other));
}

#[test]
fn test_put_overwrites() {
    let mut variables = VariableRegistry::new();
    assert!(variables.put("answer", Instance::new(41_i32)).is_none());
    let previous = variables.put("answer", Instance::new(42_i32)).unwrap();

    assert_eq!(previous.downcast::<i32>(), Some(41));
    assert_eq!(variables.get_as::<i32>("answer").unwrap(), 42);
    assert_eq!(variables.len(), 1);
}

#[test]
fn test_missing_variable_is_an_error() {
    let variables = VariableRegistry::new();
    let err = variables.lookup("appEngine").unwrap_err();
    assert!(matches!(err, AssemblyError::MissingDependencyVariable { key } if key == "appEngine"));
}

#[test]
fn test_get_as_wrong_type() {
    let mut variables = VariableRegistry::new();
    variables.put("port", Instance::new(8080_u16));
    assert!(matches!(
        variables.get_as::<String>("port"),
        Err(AssemblyError::TypeMismatch { .. })
    ));
}

#[test]
fn test_clear_and_keys() {
    let mut variables = VariableRegistry::new();
    variables.put("b", Instance::new(()));
    variables.put("a", Instance::new(()));
    assert_eq!(variables.keys(), vec!["a", "b"]);

    variables.clear();
    assert!(variables.is_empty());
    assert!(!variables.contains("a"));
}
