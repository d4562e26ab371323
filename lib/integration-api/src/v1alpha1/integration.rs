use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Integration describes a workload whose endpoints are exposed through
/// the operator-managed Ingress
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "integration.operator.io",
    version = "v1alpha1",
    kind = "Integration",
    plural = "integrations",
    namespaced,
    derive = "Default",
    status = "IntegrationStatus",
    printcolumn = r#"{"name":"Ready","type":"string","jsonPath":".status.ready"}"#,
    printcolumn = r#"{"name":"Host","type":"string","jsonPath":".status.ingressHost"}"#,
)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationSpec {
    /// Container image built and deployed for this integration
    pub image: String,

    /// Desired replica count
    #[serde(default = "default_replicas")]
    pub replicas: i32,

    /// Inbound endpoint ports, exposed in the given order
    #[serde(default)]
    pub inbound_ports: Vec<u16>,
}

/// Status of an Integration
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationStatus {
    /// Whether the routes for this integration are in place
    #[serde(default)]
    pub ready: bool,

    /// Host the integration is reachable on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_host: Option<String>,

    /// Number of paths routed to this integration
    #[serde(default)]
    pub route_count: u32,

    /// Registry type used to resolve the build configuration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_type: Option<String>,
}

fn default_replicas() -> i32 {
    1
}
