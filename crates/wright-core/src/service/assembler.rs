use crate::factory::error::AssemblyError;
use crate::factory::ComponentFactory;
use crate::kernel::component::VariableLookup;
use crate::manifest::ServiceDescriptor;
use crate::service::manager::ServiceManager;

/// Outcome of one assembly run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Names registered with the service manager, in order
    pub registered: Vec<String>,
    /// Names whose type only offers a zero-argument constructor
    pub skipped: Vec<String>,
}

/// Builds declared services from published variables.
#[derive(Debug)]
pub struct ServiceAssembler<'a> {
    factory: &'a ComponentFactory,
}

impl<'a> ServiceAssembler<'a> {
    pub fn new(factory: &'a ComponentFactory) -> Self {
        Self { factory }
    }

    /// Construct every service in declaration order and register it.
    ///
    /// A service whose first constructor takes no parameters is neither
    /// constructed nor registered.
    pub fn assemble(
        &self,
        services: &[ServiceDescriptor],
        variables: &dyn VariableLookup,
        manager: &dyn ServiceManager,
    ) -> Result<AssemblyReport, AssemblyError> {
        let mut report = AssemblyReport::default();

        for descriptor in services {
            let constructor = self.factory.implicit_constructor(&descriptor.type_id)?;
            if constructor.arity() == 0 {
                log::warn!(
                    "Service '{}' ({}) has no constructor dependencies; not registered",
                    descriptor.name,
                    descriptor.type_id
                );
                report.skipped.push(descriptor.name.clone());
                continue;
            }

            let instance = self
                .factory
                .construct_implicit(&descriptor.type_id, variables)?;
            manager.add_service(&descriptor.name, instance);
            log::info!("Assembled service '{}' ({})", descriptor.name, descriptor.type_id);
            report.registered.push(descriptor.name.clone());
        }

        Ok(report)
    }
}
