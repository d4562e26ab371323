//! Core reconciliation logic for the integration operator
//!
//! This library provides:
//! - Route computation for a workload and idempotent merging into the
//!   managed rule collection
//! - Mapping between route rules and `networking.k8s.io/v1` Ingress rules
//! - Registry configuration strategies keyed by registry type

pub mod error;
pub mod ingress;
pub mod merge;
pub mod registry;
pub mod route;
pub mod workload;

pub use error::{CoreError, Result};
pub use merge::merge;
pub use registry::{ConfigFactory, ConfigRegistry, RegistryConfig, RegistrySelection, RegistryType};
pub use route::{build_routes, RouteCollection, RoutePath, RouteRule};
pub use workload::WorkloadSpec;
