//! Model-Based Registry Tests
//!
//! Random operation sequences checked against a `HashSet` of connected names.

use crate::common::*;
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Connect(u8),
    Disconnect(u8),
    Lookup(u8),
    DisconnectAll,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..12).prop_map(Op::Connect),
        3 => (0u8..12).prop_map(Op::Disconnect),
        3 => (0u8..12).prop_map(Op::Lookup),
        1 => Just(Op::DisconnectAll),
    ]
}

fn name(key: u8) -> String {
    format!("model{}.db", key)
}

proptest! {
    #[test]
    fn registry_matches_set_model(ops in proptest::collection::vec(op(), 1..120)) {
        let t = TestRegistry::new();
        let mut model: HashSet<u8> = HashSet::new();

        for op in ops {
            match op {
                Op::Connect(k) => {
                    let opens_before = t.engine.opens_for(&name(k));
                    let conn = t.registry.connect(&name(k)).unwrap();
                    prop_assert_eq!(conn.filename(), name(k));
                    let expected = if model.contains(&k) { opens_before } else { opens_before + 1 };
                    prop_assert_eq!(t.engine.opens_for(&name(k)), expected);
                    model.insert(k);
                }
                Op::Disconnect(k) => {
                    t.registry.disconnect(&name(k)).unwrap();
                    model.remove(&k);
                }
                Op::Lookup(k) => {
                    prop_assert_eq!(t.registry.lookup(&name(k)).is_some(), model.contains(&k));
                }
                Op::DisconnectAll => {
                    t.registry.disconnect_all().unwrap();
                    model.clear();
                }
            }
            prop_assert_eq!(t.registry.count(), model.len());
            prop_assert_eq!(t.engine.live_count(), model.len());
        }

        let mut expected: Vec<String> = model.iter().map(|k| name(*k)).collect();
        expected.sort();
        let actual: Vec<String> = t
            .registry
            .identifiers()
            .iter()
            .map(|id| id.filename().to_string())
            .collect();
        prop_assert_eq!(actual, expected);
    }
}
