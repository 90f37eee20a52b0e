use crate::kernel::component::Instance;
use crate::stage_manager::context::{ExecutionMode, StageContext};
use crate::stage_manager::error::StageSystemError;

#[test]
fn test_context_creation_live() {
    let context = StageContext::new_live();

    assert!(!context.is_dry_run());
    assert_eq!(context.mode, ExecutionMode::Live);
    assert!(context.get_data::<i32>("initial_check").is_none());
    assert!(context.variables().is_empty());
}

#[test]
fn test_context_creation_dry_run() {
    let context = StageContext::new_dry_run();
    assert!(context.is_dry_run());
}

#[test]
fn test_context_data_storage_retrieval() {
    let mut context = StageContext::new_live();

    context.set_data("my_string", "hello".to_string());
    context.set_data("my_int", 42_u32);

    assert_eq!(context.get_data::<String>("my_string").unwrap(), "hello");
    assert_eq!(*context.get_data::<u32>("my_int").unwrap(), 42);
    // Wrong type yields None
    assert!(context.get_data::<i64>("my_int").is_none());

    if let Some(value) = context.get_data_mut::<u32>("my_int") {
        *value += 1;
    }
    assert_eq!(*context.get_data::<u32>("my_int").unwrap(), 43);
}

#[test]
fn test_require_reports_missing_and_mistyped() {
    let mut context = StageContext::new_live();
    context.set_data("count", 3_u8);

    assert_eq!(context.require::<u8>("count").unwrap(), 3);
    assert!(matches!(
        context.require::<u8>("absent"),
        Err(StageSystemError::ContextError { key, .. }) if key == "absent"
    ));
    assert!(matches!(
        context.require::<String>("count"),
        Err(StageSystemError::ContextError { key, .. }) if key == "count"
    ));
}

#[test]
fn test_variables_survive_into_registry() {
    let mut context = StageContext::new_live();
    context.variables_mut().put("answer", Instance::new(42_i32));

    let variables = context.into_variables();
    assert_eq!(variables.get_as::<i32>("answer").unwrap(), 42);
}
