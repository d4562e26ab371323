//! Idempotent merging of a candidate rule into a rule collection
//!
//! Reconciliation runs repeatedly against an unchanged desired state, so
//! merging must never grow a collection that already holds the candidate.
//! Merging is strictly additive: rules left behind by renamed or deleted
//! workloads are not removed.

use crate::route::{RouteCollection, RouteRule};
use tracing::debug;

/// Merge `candidate`, bound to `host`, into `existing`.
///
/// Returns the collection to persist and whether an identical rule was
/// already present. When absent the rule is appended after all existing
/// entries; when present `existing` is returned untouched.
pub fn merge(
    mut existing: RouteCollection,
    candidate: RouteRule,
    host: &str,
) -> (RouteCollection, bool) {
    let rule = candidate.with_host(host);

    if contains_rule(&existing, &rule) {
        debug!("Route rule for host {} already present", host);
        return (existing, true);
    }

    debug!(
        "Appending route rule for host {} with {} paths",
        host,
        rule.paths.len()
    );
    existing.push(rule);
    (existing, false)
}

/// Whether any rule in `rules` is structurally equal to `rule`
pub fn contains_rule<'a>(rules: impl IntoIterator<Item = &'a RouteRule>, rule: &RouteRule) -> bool {
    rules.into_iter().any(|existing| existing == rule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{build_routes, RoutePath};
    use crate::workload::WorkloadSpec;
    use proptest::prelude::*;

    const HOST: &str = "integration.local";

    fn other_rule() -> RouteRule {
        RouteRule::new("other.local", vec![RoutePath::new("/other(/|$)(.*)", "other", 8290)])
    }

    #[test]
    fn test_merge_into_empty() {
        let candidate = build_routes(&WorkloadSpec::new("svc1", vec![8080]));
        let (rules, present) = merge(Vec::new(), candidate.clone(), HOST);

        assert!(!present);
        assert_eq!(rules, vec![candidate.with_host(HOST)]);
    }

    #[test]
    fn test_merge_twice_is_noop() {
        let candidate = build_routes(&WorkloadSpec::new("svc1", vec![8080]));
        let (first, _) = merge(vec![other_rule()], candidate.clone(), HOST);
        let (second, present) = merge(first.clone(), candidate, HOST);

        assert!(present);
        assert_eq!(second, first);
    }

    #[test]
    fn test_merge_appends_after_existing() {
        let candidate = build_routes(&WorkloadSpec::new("svc1", vec![]));
        let (rules, present) = merge(vec![other_rule()], candidate, HOST);

        assert!(!present);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0], other_rule());
        assert_eq!(rules[1].host, HOST);
    }

    #[test]
    fn test_same_paths_different_host_is_new() {
        let candidate = build_routes(&WorkloadSpec::new("svc1", vec![8080]));
        let (rules, _) = merge(Vec::new(), candidate.clone(), "a.local");
        let (rules, present) = merge(rules, candidate, "b.local");

        assert!(!present);
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_changed_ports_add_rule_without_pruning() {
        let before = build_routes(&WorkloadSpec::new("svc1", vec![8080]));
        let after = build_routes(&WorkloadSpec::new("svc1", vec![8080, 9090]));
        let (rules, _) = merge(Vec::new(), before.clone(), HOST);
        let (rules, present) = merge(rules, after, HOST);

        assert!(!present);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0], before.with_host(HOST));
    }

    #[test]
    fn test_reordered_paths_are_not_a_duplicate() {
        let candidate = build_routes(&WorkloadSpec::new("svc1", vec![8080, 9090]));
        let reordered = build_routes(&WorkloadSpec::new("svc1", vec![9090, 8080]));
        let (rules, _) = merge(Vec::new(), candidate, HOST);
        let (rules, present) = merge(rules, reordered, HOST);

        assert!(!present);
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_match_found_past_first_entry() {
        let candidate = build_routes(&WorkloadSpec::new("svc1", vec![8080]));
        let existing = vec![other_rule(), candidate.clone().with_host(HOST), other_rule()];
        let (rules, present) = merge(existing.clone(), candidate, HOST);

        assert!(present);
        assert_eq!(rules, existing);
    }

    fn workload_strategy() -> impl Strategy<Value = WorkloadSpec> {
        ("[a-z][a-z0-9-]{0,12}", prop::collection::vec(any::<u16>(), 0..6))
            .prop_map(|(name, ports)| WorkloadSpec::new(name, ports))
    }

    proptest! {
        #[test]
        fn prop_merge_is_idempotent(
            workload in workload_strategy(),
            seed in prop::collection::vec(workload_strategy(), 0..4),
        ) {
            let existing: RouteCollection = seed
                .iter()
                .map(|w| build_routes(w).with_host(HOST))
                .collect();
            let (once, _) = merge(existing, build_routes(&workload), HOST);
            let (twice, present) = merge(once.clone(), build_routes(&workload), HOST);

            prop_assert!(present);
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn prop_new_rule_appends_one_entry(
            workload in workload_strategy(),
            seed in prop::collection::vec(workload_strategy(), 0..4),
        ) {
            let existing: RouteCollection = seed
                .iter()
                .map(|w| build_routes(w).with_host("seed.local"))
                .collect();
            let (merged, present) = merge(existing.clone(), build_routes(&workload), HOST);

            prop_assert!(!present);
            prop_assert_eq!(merged.len(), existing.len() + 1);
            prop_assert_eq!(&merged[..existing.len()], &existing[..]);
        }
    }
}
