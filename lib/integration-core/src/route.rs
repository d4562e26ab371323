//! Route rules and the paths computed for a workload

use crate::workload::{WorkloadSpec, DEFAULT_HTTP_PORT};

/// Capture suffix appended to every path prefix so the backend receives the
/// remainder of the request path
const PATH_SUFFIX: &str = "(/|$)(.*)";

/// Ordered list of route rules as persisted on the managed Ingress
pub type RouteCollection = Vec<RouteRule>;

/// A URL pattern routed to a service port
#[derive(Clone, Debug)]
pub struct RoutePath {
    pub pattern: String,
    pub service: String,
    pub port: u16,
}

impl RoutePath {
    pub fn new(pattern: impl Into<String>, service: impl Into<String>, port: u16) -> Self {
        Self {
            pattern: pattern.into(),
            service: service.into(),
            port,
        }
    }
}

impl PartialEq for RoutePath {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.service == other.service && self.port == other.port
    }
}

impl Eq for RoutePath {}

/// A host together with its ordered paths
#[derive(Clone, Debug, Default)]
pub struct RouteRule {
    pub host: String,
    pub paths: Vec<RoutePath>,
}

impl RouteRule {
    pub fn new(host: impl Into<String>, paths: Vec<RoutePath>) -> Self {
        Self {
            host: host.into(),
            paths,
        }
    }

    /// Returns this rule bound to `host`
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }
}

/// Order-sensitive: the same paths in a different order are a different rule.
impl PartialEq for RouteRule {
    fn eq(&self, other: &Self) -> bool {
        if self.host != other.host || self.paths.len() != other.paths.len() {
            return false;
        }
        self.paths.iter().zip(&other.paths).all(|(a, b)| a == b)
    }
}

impl Eq for RouteRule {}

/// Build the rule exposing `workload`, without a host.
///
/// The first path routes `/<service>` to the HTTP port; each inbound port
/// then gets `/<service>-inbound/<port>` routed to that port, in input order.
pub fn build_routes(workload: &WorkloadSpec) -> RouteRule {
    let service = workload.service_name();
    let inbound = workload.inbound_service_name();

    let mut paths = Vec::with_capacity(workload.inbound_ports.len() + 1);
    paths.push(RoutePath::new(
        format!("/{}{}", service, PATH_SUFFIX),
        service.clone(),
        DEFAULT_HTTP_PORT,
    ));

    for port in &workload.inbound_ports {
        paths.push(RoutePath::new(
            format!("/{}/{}{}", inbound, port, PATH_SUFFIX),
            service.clone(),
            *port,
        ));
    }

    RouteRule::new(String::new(), paths)
}
