#![cfg(test)]

// Property tests for AdaptiveMap kept inside the crate so they can observe
// the structural version and every backend directly.

use crate::{AdaptiveMap, BackendKind, Comparer, FnEquality, MapError};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum Op {
    Add(usize, i32),
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(i32),
    Mutate(usize, i32),
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<i32>, Vec<Op>)> {
    proptest::collection::vec(-1000i32..1000, 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Add(i, v)),
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            3 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Get),
            1 => (-1000i32..1000).prop_map(Op::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::Clear),
            1 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn identity() -> Comparer<i32> {
    Rc::new(FnEquality::new(|a: &i32, b: &i32| a == b, |k: &i32| *k as u32))
}

// Every key lands on one probe chain.
fn colliding() -> Comparer<i32> {
    Rc::new(FnEquality::new(|a: &i32, b: &i32| a == b, |_: &i32| 0x1234_5678u32))
}

fn configurations() -> Vec<(&'static str, AdaptiveMap<i32, i32>)> {
    vec![
        ("native", AdaptiveMap::new()),
        ("small", AdaptiveMap::with_comparer(identity())),
        ("presized", AdaptiveMap::with_capacity_and_comparer(64, identity())),
        ("colliding", AdaptiveMap::with_comparer(colliding())),
    ]
}

// Property: State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `add` fails exactly when the key is present and then changes nothing.
// - `insert` returns the previous value; last write wins.
// - `remove` reports presence and never disturbs other keys.
// - `len` tracks the model on every backend, including across promotion,
//   resizes, and remove-rebuilds.
// - The backend kind never changes except Small -> Hash.
// - Iteration yields the model's pairs exactly once each.
fn run(name: &str, mut sut: AdaptiveMap<i32, i32>, pool: &[i32], ops: &[Op]) -> Result<(), TestCaseError> {
    let mut model: HashMap<i32, i32> = HashMap::new();
    let initial = sut.backend();

    for op in ops {
        match *op {
            Op::Add(i, v) => {
                let k = pool[i];
                let already = model.contains_key(&k);
                match sut.add(k, v) {
                    Ok(()) => {
                        prop_assert!(!already, "{}: add must fail on duplicate", name);
                        model.insert(k, v);
                    }
                    Err(MapError::DuplicateKey) => {
                        prop_assert!(already, "{}: duplicate error only when key exists", name);
                    }
                    Err(e) => prop_assert!(false, "{}: unexpected error {:?}", name, e),
                }
            }
            Op::Insert(i, v) => {
                let k = pool[i];
                prop_assert_eq!(sut.insert(k, v), model.insert(k, v), "{}", name);
            }
            Op::Remove(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.remove(&k), model.remove(&k).is_some(), "{}", name);
                prop_assert!(!sut.contains_key(&k));
            }
            Op::Get(i) => {
                let k = pool[i];
                prop_assert_eq!(sut.get(&k), model.get(&k), "{}", name);
                match model.get(&k) {
                    Some(v) => prop_assert_eq!(sut.try_get(&k), Ok(v)),
                    None => prop_assert_eq!(sut.try_get(&k), Err(MapError::KeyNotFound)),
                }
            }
            Op::Contains(k) => {
                prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k), "{}", name);
            }
            Op::Mutate(i, d) => {
                let k = pool[i];
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Some(s), Some(m)) => {
                        *s = s.wrapping_add(d);
                        *m = m.wrapping_add(d);
                    }
                    (None, None) => {}
                    _ => prop_assert!(false, "{}: get_mut presence mismatch", name),
                }
            }
            Op::Clear => {
                sut.clear();
                model.clear();
            }
            Op::Iterate => {
                let s: BTreeMap<i32, i32> = sut.iter().map(|(k, v)| (*k, *v)).collect();
                let m: BTreeMap<i32, i32> = model.iter().map(|(k, v)| (*k, *v)).collect();
                prop_assert_eq!(sut.iter().count(), sut.len());
                prop_assert_eq!(s, m, "{}", name);
            }
        }

        prop_assert_eq!(sut.len(), model.len(), "{}", name);
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        let kind = sut.backend();
        prop_assert!(
            kind == initial || (initial == BackendKind::Small && kind == BackendKind::Hash),
            "{}: backend moved from {:?} to {:?}",
            name,
            initial,
            kind
        );
    }

    for (k, v) in &model {
        prop_assert_eq!(sut.get(k), Some(v), "{}", name);
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        for (name, sut) in configurations() {
            run(name, sut, &pool, &ops)?;
        }
    }

    // Round trip: re-inserting the enumerated pairs into a fresh map of
    // the same configuration yields an equal map.
    #[test]
    fn prop_enumerate_reinsert_round_trip(pairs in proptest::collection::vec((any::<i32>(), any::<i32>()), 0..80)) {
        let fresh: [fn() -> AdaptiveMap<i32, i32>; 3] = [
            AdaptiveMap::new,
            || AdaptiveMap::with_comparer(identity()),
            || AdaptiveMap::with_comparer(colliding()),
        ];
        for make in fresh {
            let mut a = make();
            for &(k, v) in &pairs {
                a.insert(k, v);
            }
            let mut b = make();
            for (k, v) in a.iter() {
                prop_assert!(b.add(*k, *v).is_ok());
            }
            prop_assert_eq!(a.len(), b.len());
            prop_assert!(a == b);
            let mut copied = vec![(0, 0); a.len()];
            a.copy_to(&mut copied, 0).unwrap();
            let rebuilt: AdaptiveMap<i32, i32> = copied.into_iter().collect();
            prop_assert!(rebuilt == a);
        }
    }
}
