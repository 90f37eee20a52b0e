#![cfg(test)]

pub mod common;
pub mod assembly_tests;
pub mod failure_tests;
pub mod lifecycle_tests;
