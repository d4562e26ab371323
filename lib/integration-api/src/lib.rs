//! Integration operator API types and CRDs for Kubernetes integration
//!
//! This library defines the custom resources watched by the operator:
//! - Integration: a workload whose HTTP and inbound endpoints are exposed
//!   through the operator-managed Ingress

pub mod v1alpha1;

pub use v1alpha1::{Integration, IntegrationSpec, IntegrationStatus};
