#[cfg(test)]
mod component_tests;
