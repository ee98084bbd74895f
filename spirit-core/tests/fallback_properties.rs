//! Property tests for key-fallback resolution.

use proptest::prelude::*;
use spirit_core::{KeyFallbackResolver, KeyFallbackSpec, Tags, TopicName};

const CANDIDATES: [&str; 3] = ["name:de", "name:en", "name"];

fn resolver() -> KeyFallbackResolver {
    let topic = TopicName::new("core/name-with-fallback").expect("valid topic name");
    let spec = KeyFallbackSpec::new("label", CANDIDATES).expect("valid fallback");
    let mut resolver = KeyFallbackResolver::default();
    resolver.register(&topic, spec).expect("first registration");
    resolver
}

/// Distinct tag entries drawn from the candidate keys plus unrelated keys.
fn tag_entries() -> impl Strategy<Value = Vec<(String, String)>> {
    let key = prop_oneof![
        Just("name:de".to_owned()),
        Just("name:en".to_owned()),
        Just("name".to_owned()),
        "[a-z]{1,8}",
    ];
    proptest::collection::btree_map(key, "[A-Za-z ]{0,12}", 0..8)
        .prop_map(|map| map.into_iter().collect())
}

/// The same entries in two independent orders.
fn shuffled_pair() -> impl Strategy<Value = (Vec<(String, String)>, Vec<(String, String)>)> {
    tag_entries().prop_flat_map(|entries| {
        (
            Just(entries.clone()).prop_shuffle(),
            Just(entries).prop_shuffle(),
        )
    })
}

fn expected(entries: &[(String, String)]) -> Option<String> {
    let tags: Tags = entries.iter().cloned().collect();
    CANDIDATES
        .iter()
        .find_map(|candidate| tags.get(*candidate).cloned())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn resolution_ignores_insertion_order((first, second) in shuffled_pair()) {
        let resolver = resolver();
        let mut left = Tags::new();
        for (key, value) in first {
            left.insert(key, value);
        }
        let mut right = Tags::new();
        for (key, value) in second {
            right.insert(key, value);
        }
        prop_assert_eq!(resolver.resolve("label", &left), resolver.resolve("label", &right));
    }

    #[test]
    fn resolution_picks_the_first_present_candidate(entries in tag_entries()) {
        let resolver = resolver();
        let tags: Tags = entries.iter().cloned().collect();
        let want = expected(&entries);
        prop_assert_eq!(resolver.resolve("label", &tags).map(str::to_owned), want);
    }

    #[test]
    fn identical_registration_never_conflicts(times in 1_usize..5) {
        let topic = TopicName::new("core/name-with-fallback").expect("valid topic name");
        let mut resolver = KeyFallbackResolver::default();
        for _ in 0..times {
            let spec = KeyFallbackSpec::new("label", CANDIDATES).expect("valid fallback");
            prop_assert!(resolver.register(&topic, spec).is_ok());
        }
        prop_assert_eq!(resolver.output_keys().count(), 1);
    }
}
