//! Mapping between route rules and `networking.k8s.io/v1` Ingress objects

use crate::merge::merge;
use crate::route::{RouteCollection, RoutePath, RouteRule};
use crate::Result;
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;
use tracing::debug;

/// Path type required for regex path patterns
pub const PATH_TYPE: &str = "ImplementationSpecific";

/// Annotations placed on a newly created managed Ingress. The rewrite target
/// forwards the second capture group of each path pattern.
pub fn default_annotations() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "nginx.ingress.kubernetes.io/rewrite-target".to_string(),
            "/$2".to_string(),
        ),
        ("nginx.ingress.kubernetes.io/use-regex".to_string(), "true".to_string()),
    ])
}

/// Convert a route rule to its Ingress representation
pub fn to_ingress_rule(rule: &RouteRule) -> IngressRule {
    let paths = rule
        .paths
        .iter()
        .map(|path| HTTPIngressPath {
            path: Some(path.pattern.clone()),
            path_type: PATH_TYPE.to_string(),
            backend: IngressBackend {
                service: Some(IngressServiceBackend {
                    name: path.service.clone(),
                    port: Some(ServiceBackendPort {
                        number: Some(i32::from(path.port)),
                        name: None,
                    }),
                }),
                resource: None,
            },
        })
        .collect();

    IngressRule {
        host: Some(rule.host.clone()),
        http: Some(HTTPIngressRuleValue { paths }),
    }
}

/// Read an Ingress rule back as a route rule.
///
/// Returns `None` for rules this operator could not have written: resource
/// backends, named ports, missing paths or a different path type. Such rules
/// can never equal a computed candidate.
pub fn from_ingress_rule(rule: &IngressRule) -> Option<RouteRule> {
    let paths = match &rule.http {
        Some(http) => http
            .paths
            .iter()
            .map(from_ingress_path)
            .collect::<Option<Vec<_>>>()?,
        None => Vec::new(),
    };

    Some(RouteRule::new(rule.host.clone().unwrap_or_default(), paths))
}

fn from_ingress_path(path: &HTTPIngressPath) -> Option<RoutePath> {
    if path.path_type != PATH_TYPE {
        return None;
    }
    let service = path.backend.service.as_ref()?;
    let number = service.port.as_ref()?.number?;

    Some(RoutePath::new(
        path.path.clone()?,
        service.name.clone(),
        u16::try_from(number).ok()?,
    ))
}

/// Merge `candidate`, bound to `host`, into the rules of an existing Ingress.
///
/// Existing rules are returned untouched and in order; the candidate is
/// appended only when no existing rule equals it.
pub fn merge_ingress_rules(
    mut existing: Vec<IngressRule>,
    candidate: RouteRule,
    host: &str,
) -> (Vec<IngressRule>, bool) {
    let current: RouteCollection = existing.iter().filter_map(from_ingress_rule).collect();
    let (mut merged, present) = merge(current, candidate, host);

    if !present {
        if let Some(rule) = merged.pop() {
            existing.push(to_ingress_rule(&rule));
        }
    }

    (existing, present)
}

/// Rules currently held by `ingress`
pub fn ingress_rules(ingress: &Ingress) -> Vec<IngressRule> {
    ingress
        .spec
        .as_ref()
        .and_then(|spec| spec.rules.clone())
        .unwrap_or_default()
}

/// Build the managed Ingress holding `rules`
pub fn new_ingress(
    name: &str,
    namespace: &str,
    ingress_class: Option<&str>,
    rules: Vec<IngressRule>,
) -> Ingress {
    debug!("Building Ingress {}/{} with {} rules", namespace, name, rules.len());

    Ingress {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations: Some(default_annotations()),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            ingress_class_name: ingress_class.map(str::to_string),
            rules: Some(rules),
            ..Default::default()
        }),
        status: None,
    }
}

/// Merge patch replacing the rule list of the managed Ingress.
///
/// With a `resource_version` the API server rejects the patch if the Ingress
/// changed since it was read, so concurrent merges cannot drop each other's
/// rules.
pub fn rules_patch(rules: &[IngressRule], resource_version: Option<&str>) -> Result<serde_json::Value> {
    let rules = serde_json::to_value(rules)?;
    let mut patch = serde_json::json!({ "spec": { "rules": rules } });
    if let Some(version) = resource_version {
        patch["metadata"] = serde_json::json!({ "resourceVersion": version });
    }
    Ok(patch)
}
