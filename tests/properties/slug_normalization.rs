//! Property tests for slug normalization.

use proptest::prelude::*;

use mocksmith::domain::value_objects::{EntityKey, Slug};

fn raw_name() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 _./\\\\-]{0,40}").unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: `Slug::normalize` never panics on arbitrary input.
    #[test]
    fn property_normalize_never_panics(raw in "(?s).{0,128}") {
        let _ = Slug::normalize(&raw);
    }

    /// PROPERTY: Normalizing a slug again yields the same slug.
    #[test]
    fn property_normalize_is_idempotent(raw in raw_name()) {
        if let Ok(slug) = Slug::normalize(&raw) {
            let again = Slug::normalize(slug.as_str());
            prop_assert_eq!(again.as_ref(), Ok(&slug));
        }
    }

    /// PROPERTY: A slug is always a safe relative path.
    #[test]
    fn property_slug_segments_are_safe(raw in raw_name()) {
        if let Ok(slug) = Slug::normalize(&raw) {
            for segment in slug.as_str().split('/') {
                prop_assert!(!segment.is_empty());
                prop_assert!(segment != "." && segment != "..", "segment {:?}", segment);
                prop_assert!(!segment.starts_with('-') && !segment.ends_with('-'));
                prop_assert!(!segment.contains(char::is_whitespace));
                prop_assert!(!segment.contains('\\'));
            }
            prop_assert_eq!(slug.as_str().to_lowercase(), slug.as_str());
        }
    }

    /// PROPERTY: Entity keys parse back from their display form.
    #[test]
    fn property_entity_key_display_parses_back(
        raw in "[a-z][a-z0-9-]{0,12}(/[a-z][a-z0-9-]{0,12}){0,2}",
        variant in proptest::option::of("[a-z]{1,8}"),
    ) {
        let slug = Slug::normalize(&raw).unwrap();
        let key = match variant {
            Some(tag) => EntityKey::variant(slug, tag),
            None => EntityKey::base(slug),
        };
        let parsed: EntityKey = key.to_string().parse().unwrap();
        prop_assert_eq!(parsed, key);
    }
}
