/// API version v1alpha1 for Integration operator CRDs

pub mod integration;

pub use integration::{Integration, IntegrationSpec, IntegrationStatus};

/// API group for Integration operator resources
pub const API_GROUP: &str = "integration.operator.io";
/// API version for Integration operator resources
pub const API_VERSION: &str = "v1alpha1";
