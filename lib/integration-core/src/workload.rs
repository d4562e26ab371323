//! Workload description and the names derived from it

use integration_api::Integration;
use std::collections::BTreeMap;

/// Port the primary service listens on for HTTP traffic
pub const DEFAULT_HTTP_PORT: u16 = 8290;

/// A workload whose endpoints should be routable
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkloadSpec {
    pub name: String,
    /// Inbound endpoint ports, in exposure order. Duplicates are kept.
    pub inbound_ports: Vec<u16>,
}

impl WorkloadSpec {
    pub fn new(name: impl Into<String>, inbound_ports: Vec<u16>) -> Self {
        Self {
            name: name.into(),
            inbound_ports,
        }
    }

    /// Name of the service fronting this workload
    pub fn service_name(&self) -> String {
        self.name.clone()
    }

    /// Name used as the path prefix for inbound endpoints
    pub fn inbound_service_name(&self) -> String {
        format!("{}-inbound", self.name)
    }

    pub fn deployment_name(&self) -> String {
        format!("{}-deployment", self.name)
    }

    /// Labels selecting the resources that belong to this workload
    pub fn labels(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("app".to_string(), "integration".to_string()),
            ("integration_cr".to_string(), self.name.clone()),
        ])
    }
}

impl From<&Integration> for WorkloadSpec {
    fn from(integration: &Integration) -> Self {
        Self {
            name: integration.metadata.name.clone().unwrap_or_default(),
            inbound_ports: integration.spec.inbound_ports.clone(),
        }
    }
}
