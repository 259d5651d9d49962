//! Property tests for the shared route registry.

use std::collections::BTreeSet;

use proptest::prelude::*;

use mocksmith::domain::services::route_registry::{entry_for, merge, parse_entries, route_entry};
use mocksmith::domain::value_objects::Slug;

fn slugs() -> impl Strategy<Value = BTreeSet<String>> {
    proptest::collection::btree_set("[a-z]{1,6}(/[a-z]{1,6})?", 1..8)
}

fn entry(slug: &Slug) -> String {
    route_entry(slug, &format!("./pages/{}/Page", slug))
}

fn build(order: &[String]) -> String {
    let mut content: Option<String> = None;
    for raw in order {
        let slug = Slug::normalize(raw).unwrap();
        content = Some(merge(content.as_deref(), &slug, Some(&entry(&slug))).unwrap());
    }
    content.unwrap_or_default()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Registry content does not depend on the order entries were merged.
    #[test]
    fn property_merge_order_does_not_matter(
        names in slugs().prop_flat_map(|set| {
            let ordered: Vec<String> = set.into_iter().collect();
            (Just(ordered.clone()), Just(ordered).prop_shuffle())
        })
    ) {
        let (ordered, shuffled) = names;
        prop_assert_eq!(build(&ordered), build(&shuffled));
    }

    /// PROPERTY: Removing one slug leaves every other line byte-identical.
    #[test]
    fn property_removal_keeps_other_lines(names in slugs(), pick in any::<prop::sample::Index>()) {
        let ordered: Vec<String> = names.into_iter().collect();
        let content = build(&ordered);
        let victim = Slug::normalize(&ordered[pick.index(ordered.len())]).unwrap();

        let after = merge(Some(&content), &victim, None).unwrap();

        prop_assert!(entry_for(&after, &victim).is_none());
        for raw in &ordered {
            let slug = Slug::normalize(raw).unwrap();
            if slug != victim {
                prop_assert_eq!(entry_for(&after, &slug), entry_for(&content, &slug));
            }
        }
    }

    /// PROPERTY: Parsing arbitrary registry text never panics.
    #[test]
    fn property_parse_entries_never_panics(content in "(?s).{0,256}") {
        let _ = parse_entries(&content);
        let _ = parse_entries(&format!("// @generated by mocksmith\n{}", content));
    }
}
