//! # Wright Core Services
//!
//! The service registry ([`ServiceManager`]) and the [`ServiceAssembler`]
//! that fills it from the manifest's service descriptors.
pub mod assembler;
pub mod error;
pub mod manager;

pub use assembler::{AssemblyReport, ServiceAssembler};
pub use error::ServiceError;
pub use manager::{AppService, AppServiceManager, ServiceManager};
