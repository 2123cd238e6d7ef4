//! Property tests over generated JSON documents.

use deid_core::{LeafValue, Profile, deidentify, leaf_fn};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|i| Value::Number(i.into())),
        "[a-z]{0,6}".prop_map(Value::String),
    ]
}

fn field_name() -> impl Strategy<Value = String> {
    "[a-d]{1,2}"
}

/// Objects whose fields are leaves, objects, or arrays of leaves/objects.
fn document() -> impl Strategy<Value = Value> {
    let tree = leaf().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(|items| {
                // arrays only hold leaves or objects
                Value::Array(items.into_iter().filter(|v| !v.is_array()).collect())
            }),
            prop::collection::vec((field_name(), inner), 0..4).prop_map(|fields| {
                Value::Object(fields.into_iter().collect::<Map<_, _>>())
            }),
        ]
    });
    prop::collection::vec((field_name(), tree), 0..5)
        .prop_map(|fields| Value::Object(fields.into_iter().collect::<Map<_, _>>()))
}

fn redacting(pattern: &str) -> Profile<Value> {
    Profile::builder()
        .register(
            pattern,
            leaf_fn("redact", |_, value| {
                Ok(match value {
                    LeafValue::Text(s) => LeafValue::Text(format!("#{}", s.len())),
                    other => other,
                })
            }),
        )
        .unwrap()
        .build()
}

proptest! {
    #[test]
    fn unmatched_profile_leaves_document_equal(doc in document()) {
        // generated names only use a-d, so `zz` never matches
        let profile = redacting("zz.*");
        prop_assert_eq!(deidentify(&profile, &doc).unwrap(), doc);
    }

    #[test]
    fn pure_handlers_are_deterministic(doc in document()) {
        let profile = redacting("*.*");
        let first = deidentify(&profile, &doc).unwrap();
        let second = deidentify(&profile, &doc).unwrap();
        prop_assert_eq!(first, second);
    }
}
