//! Property tests for comparison and planning.

use std::collections::BTreeMap;

use proptest::prelude::*;

use mocksmith::domain::entities::{
    LatestState, MockupEntity, MockupInventory, OutputInventory, SourceFile, SourceRole,
};
use mocksmith::domain::policies::GenerationPolicy;
use mocksmith::domain::services::{build_plan, compare, Plan};
use mocksmith::domain::value_objects::{EntityKey, Fingerprint};

fn entity(key: &str, content: &str) -> MockupEntity {
    MockupEntity::new(
        key.parse().unwrap(),
        vec![SourceFile {
            role: SourceRole::Markup,
            path: format!("{}.html", key.replace('@', "-")),
        }],
        Fingerprint::from_content(content),
    )
}

/// Keys with an optional variant tag, plus the content each was built from
fn entities() -> impl Strategy<Value = Vec<(String, String)>> {
    proptest::collection::btree_map(
        "[a-z]{1,6}(@mobile)?",
        "[a-z ]{0,12}",
        0..12,
    )
    .prop_map(|m: BTreeMap<String, String>| m.into_iter().collect())
}

fn plan_for(items: &[(String, String)], policy: &GenerationPolicy) -> Plan {
    let inventory = MockupInventory::new(items.iter().map(|(k, c)| entity(k, c)).collect());
    let classifications = compare(&inventory, &OutputInventory::default(), &LatestState::new());
    build_plan(classifications, policy)
}

fn policy() -> impl Strategy<Value = GenerationPolicy> {
    (
        any::<bool>(),
        proptest::collection::vec("[a-z]{1,6}", 0..3),
    )
        .prop_map(|(allow_update, only)| GenerationPolicy {
            allow_update,
            only,
            ..Default::default()
        })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: The plan does not depend on the order mockups were enumerated.
    #[test]
    fn property_plan_is_order_independent(
        pair in entities().prop_flat_map(|items| (Just(items.clone()), Just(items).prop_shuffle())),
        policy in policy(),
    ) {
        let (ordered, shuffled) = pair;
        prop_assert_eq!(plan_for(&ordered, &policy), plan_for(&shuffled, &policy));
    }

    /// PROPERTY: Every mockup key appears in the plan exactly once.
    #[test]
    fn property_plan_covers_every_key_once(items in entities(), policy in policy()) {
        let plan = plan_for(&items, &policy);
        let mut keys: Vec<EntityKey> = plan.steps().iter().map(|s| s.key.clone()).collect();
        keys.sort();
        let mut expected: Vec<EntityKey> = items.iter().map(|(k, _)| k.parse().unwrap()).collect();
        expected.sort();
        prop_assert_eq!(keys, expected);
    }

    /// PROPERTY: Nothing outside an `only` filter is ever scheduled to write.
    #[test]
    fn property_only_filter_bounds_writes(items in entities(), policy in policy()) {
        let plan = plan_for(&items, &policy);
        for step in plan.steps() {
            if step.kind.writes() {
                prop_assert!(policy.in_scope(&step.key), "{} written outside scope", step.key);
            }
        }
    }

    /// PROPERTY: Steps are ordered by kind, then key.
    #[test]
    fn property_plan_is_sorted(items in entities(), policy in policy()) {
        let plan = plan_for(&items, &policy);
        let order: Vec<_> = plan.steps().iter().map(|s| (s.kind, s.key.clone())).collect();
        let mut sorted = order.clone();
        sorted.sort();
        prop_assert_eq!(order, sorted);
    }
}
